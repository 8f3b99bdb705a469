//! Crop-to-fill placement of photos.

use crate::error::RenderError;
use crate::geometry::{DrawRect, Rect};

/// Scales a `src_width`x`src_height` image so it covers `target` entirely,
/// preserving aspect ratio and centring the overflow on the cropped axis.
///
/// The returned rect usually spills past `target`; clipping is the caller's
/// job.
pub fn cover_fit(src_width: u32, src_height: u32, target: &Rect) -> Result<DrawRect, RenderError> {
    if src_width == 0 || src_height == 0 {
        return Err(RenderError::InvalidSource {
            width: src_width,
            height: src_height,
        });
    }

    let src_aspect = f64::from(src_width) / f64::from(src_height);
    let box_aspect = f64::from(target.width) / f64::from(target.height);
    let target = DrawRect::from(*target);

    let fitted = if src_aspect > box_aspect {
        // relatively wider: match heights, overflow left and right
        let width = target.height * src_aspect;
        DrawRect {
            x: target.x - (width - target.width) / 2.0,
            y: target.y,
            width,
            height: target.height,
        }
    } else {
        // relatively taller: match widths, overflow top and bottom
        let height = target.width / src_aspect;
        DrawRect {
            x: target.x,
            y: target.y - (height - target.height) / 2.0,
            width: target.width,
            height,
        }
    };
    Ok(fitted)
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn wide_photo_into_square_box_fits_height() {
        let target = Rect::new(100, 50, 400, 400);
        let fitted = cover_fit(1600, 900, &target).unwrap();
        assert_eq!(fitted.height, 400.0);
        assert!((fitted.width - 400.0 * 16.0 / 9.0).abs() < 1e-9);
        assert_eq!(fitted.y, 50.0);
        assert!((fitted.x - (100.0 - (fitted.width - 400.0) / 2.0)).abs() < 1e-9);
    }

    #[test]
    fn tall_photo_into_square_box_fits_width() {
        let target = Rect::new(0, 0, 400, 400);
        let fitted = cover_fit(900, 1600, &target).unwrap();
        assert_eq!(fitted.width, 400.0);
        assert_eq!(fitted.x, 0.0);
        assert!((fitted.height - 400.0 * 16.0 / 9.0).abs() < 1e-9);
        assert!((fitted.y - -(fitted.height - 400.0) / 2.0).abs() < 1e-9);
    }

    #[test]
    fn matching_aspect_is_exact() {
        let target = Rect::new(40, 275, 840, 400);
        let fitted = cover_fit(2100, 1000, &target).unwrap();
        assert_eq!((fitted.x, fitted.width), (40.0, 840.0));
        assert!((fitted.y - 275.0).abs() < 1e-9);
        assert!((fitted.height - 400.0).abs() < 1e-9);
    }

    #[test]
    fn zero_sized_source_is_rejected() {
        let target = Rect::new(0, 0, 10, 10);
        assert!(matches!(
            cover_fit(0, 10, &target),
            Err(RenderError::InvalidSource { width: 0, height: 10 })
        ));
        assert!(cover_fit(10, 0, &target).is_err());
    }

    proptest! {
        #[test]
        fn prop_result_covers_box(
            src_w in 1u32..8000,
            src_h in 1u32..8000,
            x in -500i32..500,
            y in -500i32..500,
            w in 1i32..3000,
            h in 1i32..3000,
        ) {
            let target = Rect::new(x, y, w, h);
            let fitted = cover_fit(src_w, src_h, &target).unwrap();
            prop_assert!(fitted.contains(&target, 1e-6));
            let aspect = f64::from(src_w) / f64::from(src_h);
            prop_assert!((fitted.width / fitted.height - aspect).abs() < 1e-6 * aspect.max(1.0));
        }
    }
}
