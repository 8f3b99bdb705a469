use std::path::Path;

use clap::Parser;
use miette::{Context, IntoDiagnostic, Result};
use newscard::asset::DefaultSource;
use newscard::canvas::DecodedImage;
use newscard::compose::{plan, CardDate, Compositor, RenderOutcome, RenderState};
use newscard::config::AppConfig;
use newscard::export::{encode_png, save_png, PostImagesUploader};
use newscard::fit::FitPolicy;
use newscard::measure::{EstimatedMeasure, PangoMeasure, TextMeasure};
use newscard::profile::LayoutProfile;

mod cli;

use cli::{CardArgs, Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::from(cli.log_level))
        .with_writer(std::io::stderr)
        .init();

    let config = match &cli.config {
        Some(path) => AppConfig::load(path)
            .wrap_err_with(|| format!("failed to load config from {}", path.display()))?,
        None => AppConfig::default(),
    };

    match cli.command {
        Commands::Render {
            card,
            out,
            upload,
            offline,
        } => render(&config, card, &out, upload, offline).await,
        Commands::Layout { card, estimate } => layout(&config, card, estimate),
        Commands::Profiles => {
            for profile in config.profiles() {
                println!("{}", describe(&profile));
            }
            Ok(())
        }
        Commands::Schema { out_dir } => write_schemas(&out_dir),
    }
}

fn load_photo(card: &CardArgs) -> Result<Option<DecodedImage>> {
    card.photo
        .as_ref()
        .map(|path| {
            DecodedImage::open(path)
                .wrap_err_with(|| format!("failed to load photo {}", path.display()))
        })
        .transpose()
}

async fn render(
    config: &AppConfig,
    card: CardArgs,
    out: &Path,
    upload: bool,
    offline: bool,
) -> Result<()> {
    let mut profile = config.profile(&card.profile)?;
    if offline {
        profile.background = None;
    }
    let mut state = RenderState::new(profile);
    if let Some(photo) = load_photo(&card)? {
        state.set_photo(photo)?;
    }

    let client = reqwest::Client::builder()
        .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
        .build()
        .into_diagnostic()?;
    let compositor = Compositor::new(DefaultSource::new(client.clone()))
        .with_fetch_timeout(config.fetch_timeout());

    let outcome = compositor
        .render(&state, &card.headline, CardDate::from(card.date))
        .await?;
    let RenderOutcome::Rendered(rendered) = outcome else {
        miette::bail!("render was superseded by a newer request");
    };

    let png = encode_png(&rendered.surface)?;
    save_png(&png, out).wrap_err_with(|| format!("failed to write {}", out.display()))?;
    tracing::info!(
        path = %out.display(),
        ticket = rendered.ticket.get(),
        profile = %rendered.layout.profile,
        font_size = rendered.layout.headline.font_size_px,
        fallback = rendered.used_fallback,
        "wrote card"
    );

    if upload {
        let uploader = PostImagesUploader::new(
            client,
            config.upload.endpoint().into_diagnostic()?,
            config.upload.token_url().into_diagnostic()?,
        );
        // the card is already on disk, so a failed upload is only reported
        match uploader.upload(png).await {
            Ok(url) => println!("{url}"),
            Err(err) => tracing::error!("upload failed: {:?}", miette::Report::new(err)),
        }
    }
    Ok(())
}

fn layout(config: &AppConfig, card: CardArgs, estimate: bool) -> Result<()> {
    let profile = config.profile(&card.profile)?;
    let photo = load_photo(&card)?;
    let pango;
    let measure: &dyn TextMeasure = if estimate {
        &EstimatedMeasure
    } else {
        pango = PangoMeasure::new().into_diagnostic()?;
        &pango
    };
    let layout = plan(
        &profile,
        card.headline.trim(),
        photo.as_ref(),
        CardDate::from(card.date).resolve(),
        measure,
    )?;
    println!("{}", serde_json::to_string_pretty(&layout).into_diagnostic()?);
    Ok(())
}

fn describe(profile: &LayoutProfile) -> String {
    let policy = match profile.fit_policy {
        FitPolicy::Iterative(_) => "iterative",
        FitPolicy::Tiered(_) => "tiered",
    };
    format!(
        "{:<16} {}x{}  {:<9} {}",
        profile.name,
        profile.width,
        profile.height,
        policy,
        if profile.image_box.is_some() { "photo" } else { "headline only" },
    )
}

fn write_schemas(out_dir: &Path) -> Result<()> {
    std::fs::create_dir_all(out_dir)
        .into_diagnostic()
        .wrap_err("failed to create schema directory")?;
    let schemas = [
        ("config.schema.json", schemars::schema_for!(AppConfig)),
        ("profile.schema.json", schemars::schema_for!(LayoutProfile)),
    ];
    for (name, schema) in schemas {
        let path = out_dir.join(name);
        let json = serde_json::to_string_pretty(&schema).into_diagnostic()?;
        std::fs::write(&path, json)
            .into_diagnostic()
            .wrap_err_with(|| format!("failed to write {}", path.display()))?;
        tracing::info!(path = %path.display(), "wrote schema");
    }
    Ok(())
}
