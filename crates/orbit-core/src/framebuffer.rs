//! Heap-backed framebuffer with per-pixel change detection.
//!
//! Frames are drawn into this RAM buffer instead of straight to the panel.
//! After a frame completes, only the rectangular region containing changed
//! pixels is flushed to the hardware display. On a watch face most of the
//! screen is static between ticks, so a second tick usually flushes little
//! more than the second satellite.

extern crate alloc;

use alloc::vec;
use alloc::vec::Vec;
use core::convert::Infallible;
use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::Rectangle;
use log::debug;

use crate::styling::TRUE_BLACK;

/// Bounding box of pixels that have changed since the last flush.
#[derive(Debug, Clone, Copy)]
struct DirtyRect {
    min_x: usize,
    min_y: usize,
    max_x: usize,
    max_y: usize,
}

impl DirtyRect {
    /// Expand the dirty region to include the given pixel coordinate.
    fn expand(&mut self, x: usize, y: usize) {
        self.min_x = self.min_x.min(x);
        self.min_y = self.min_y.min(y);
        self.max_x = self.max_x.max(x);
        self.max_y = self.max_y.max(y);
    }

    /// Create a new dirty rect covering a single pixel.
    fn from_point(x: usize, y: usize) -> Self {
        Self {
            min_x: x,
            min_y: y,
            max_x: x,
            max_y: y,
        }
    }

    fn to_rectangle(self) -> Rectangle {
        Rectangle::new(
            Point::new(self.min_x as i32, self.min_y as i32),
            Size::new(
                (self.max_x - self.min_x + 1) as u32,
                (self.max_y - self.min_y + 1) as u32,
            ),
        )
    }
}

/// Drawing target whose pixel dimensions follow the platform surface.
///
/// Called on every surface resize before the next frame is drawn. Fixed-size
/// panels can leave this empty.
pub trait Surface: DrawTarget<Color = Rgb565> {
    fn resize(&mut self, size: Size);
}

/// Framebuffer implementing `DrawTarget<Color = Rgb565>` for any surface size.
///
/// Drawing outside the buffer is clipped. A zero-sized buffer accepts and
/// discards everything, which keeps a face that has not been sized yet from
/// failing.
pub struct FrameBuffer {
    width: usize,
    height: usize,
    pixels: Vec<Rgb565>,
    dirty: Option<DirtyRect>,
}

impl FrameBuffer {
    /// Allocate a framebuffer of `size` filled with black pixels.
    pub fn new(size: Size) -> Self {
        let width = size.width as usize;
        let height = size.height as usize;
        Self {
            width,
            height,
            pixels: vec![TRUE_BLACK; width * height],
            dirty: None,
        }
    }

    /// Reallocate for a new surface size. All pixels become black and the
    /// whole buffer is marked dirty.
    pub fn resize(&mut self, size: Size) {
        *self = Self::new(size);
        if self.width > 0 && self.height > 0 {
            self.dirty = Some(DirtyRect {
                min_x: 0,
                min_y: 0,
                max_x: self.width - 1,
                max_y: self.height - 1,
            });
        }
    }

    /// Color of the pixel at `point`, or `None` outside the buffer.
    pub fn pixel(&self, point: Point) -> Option<Rgb565> {
        let (x, y) = self.index_of(point)?;
        Some(self.pixels[y * self.width + x])
    }

    /// Region changed since the last flush, if any.
    pub fn dirty_area(&self) -> Option<Rectangle> {
        self.dirty.map(DirtyRect::to_rectangle)
    }

    fn index_of(&self, point: Point) -> Option<(usize, usize)> {
        if point.x < 0 || point.y < 0 {
            return None;
        }
        let (x, y) = (point.x as usize, point.y as usize);
        (x < self.width && y < self.height).then_some((x, y))
    }

    /// Write a single pixel, expanding the dirty rect only if the color changed.
    #[inline]
    fn set_pixel(&mut self, x: usize, y: usize, color: Rgb565) {
        let idx = y * self.width + x;
        if self.pixels[idx] != color {
            self.pixels[idx] = color;
            match &mut self.dirty {
                Some(rect) => rect.expand(x, y),
                None => self.dirty = Some(DirtyRect::from_point(x, y)),
            }
        }
    }

    /// Flush the dirty region to a hardware display, then reset the dirty state.
    ///
    /// Only the bounding rectangle of changed pixels is sent, via
    /// `fill_contiguous`. If nothing changed, this is a no-op.
    pub fn flush<D>(&mut self, display: &mut D) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = Rgb565>,
    {
        let Some(rect) = self.dirty.take() else {
            return Ok(());
        };

        let area = rect.to_rectangle();
        debug!(
            "Flushing {}x{} dirty region at ({}, {})",
            area.size.width, area.size.height, rect.min_x, rect.min_y
        );

        let pixels = &self.pixels;
        let stride = self.width;
        let row_len = area.size.width as usize;
        let pixel_iter = (rect.min_y..=rect.max_y).flat_map(move |y| {
            let row_start = y * stride + rect.min_x;
            pixels[row_start..row_start + row_len].iter().copied()
        });

        display.fill_contiguous(&area, pixel_iter)
    }
}

impl OriginDimensions for FrameBuffer {
    fn size(&self) -> Size {
        Size::new(self.width as u32, self.height as u32)
    }
}

impl Surface for FrameBuffer {
    fn resize(&mut self, size: Size) {
        FrameBuffer::resize(self, size);
    }
}

impl DrawTarget for FrameBuffer {
    type Color = Rgb565;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(coord, color) in pixels {
            if let Some((x, y)) = self.index_of(coord) {
                self.set_pixel(x, y, color);
            }
        }
        Ok(())
    }

    fn fill_solid(&mut self, area: &Rectangle, color: Self::Color) -> Result<(), Self::Error> {
        let area = area.intersection(&self.bounding_box());
        let Some(bottom_right) = area.bottom_right() else {
            return Ok(());
        };

        for y in area.top_left.y..=bottom_right.y {
            for x in area.top_left.x..=bottom_right.x {
                self.set_pixel(x as usize, y as usize, color);
            }
        }
        Ok(())
    }

    fn clear(&mut self, color: Self::Color) -> Result<(), Self::Error> {
        for y in 0..self.height {
            for x in 0..self.width {
                self.set_pixel(x, y, color);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::styling::WHITE;
    use embedded_graphics::primitives::PrimitiveStyle;

    /// Target that records the last `fill_contiguous` call.
    struct Recorder {
        area: Option<Rectangle>,
        colors: Vec<Rgb565>,
    }

    impl OriginDimensions for Recorder {
        fn size(&self) -> Size {
            Size::new(64, 64)
        }
    }

    impl DrawTarget for Recorder {
        type Color = Rgb565;
        type Error = Infallible;

        fn draw_iter<I>(&mut self, _pixels: I) -> Result<(), Self::Error>
        where
            I: IntoIterator<Item = Pixel<Self::Color>>,
        {
            Ok(())
        }

        fn fill_contiguous<I>(&mut self, area: &Rectangle, colors: I) -> Result<(), Self::Error>
        where
            I: IntoIterator<Item = Self::Color>,
        {
            self.area = Some(*area);
            self.colors = colors.into_iter().collect();
            Ok(())
        }
    }

    #[test]
    fn test_new_buffer_is_clean_and_black() {
        let fb = FrameBuffer::new(Size::new(8, 4));
        assert_eq!(fb.pixel(Point::new(7, 3)), Some(TRUE_BLACK));
        assert_eq!(fb.pixel(Point::new(8, 0)), None);
        assert_eq!(fb.pixel(Point::new(-1, 0)), None);
        assert!(fb.dirty_area().is_none());
    }

    #[test]
    fn test_dirty_area_tracks_changed_pixels() {
        let mut fb = FrameBuffer::new(Size::new(16, 16));
        Rectangle::new(Point::new(2, 3), Size::new(4, 2))
            .into_styled(PrimitiveStyle::with_fill(WHITE))
            .draw(&mut fb)
            .unwrap();

        assert_eq!(
            fb.dirty_area(),
            Some(Rectangle::new(Point::new(2, 3), Size::new(4, 2)))
        );
    }

    #[test]
    fn test_same_color_does_not_dirty() {
        let mut fb = FrameBuffer::new(Size::new(4, 4));
        fb.clear(TRUE_BLACK).unwrap();
        assert!(fb.dirty_area().is_none());
    }

    #[test]
    fn test_flush_sends_dirty_region_once() {
        let mut fb = FrameBuffer::new(Size::new(16, 16));
        fb.fill_solid(&Rectangle::new(Point::new(5, 5), Size::new(2, 3)), WHITE)
            .unwrap();

        let mut recorder = Recorder {
            area: None,
            colors: Vec::new(),
        };
        fb.flush(&mut recorder).unwrap();
        assert_eq!(
            recorder.area,
            Some(Rectangle::new(Point::new(5, 5), Size::new(2, 3)))
        );
        assert_eq!(recorder.colors.len(), 6);
        assert!(recorder.colors.iter().all(|&c| c == WHITE));

        recorder.area = None;
        fb.flush(&mut recorder).unwrap();
        assert!(recorder.area.is_none());
    }

    #[test]
    fn test_drawing_is_clipped() {
        let mut fb = FrameBuffer::new(Size::new(4, 4));
        fb.fill_solid(&Rectangle::new(Point::new(-2, -2), Size::new(4, 4)), WHITE)
            .unwrap();
        assert_eq!(fb.pixel(Point::new(0, 0)), Some(WHITE));
        assert_eq!(fb.pixel(Point::new(1, 1)), Some(WHITE));
        assert_eq!(fb.pixel(Point::new(2, 2)), Some(TRUE_BLACK));
    }

    #[test]
    fn test_resize_marks_everything_dirty() {
        let mut fb = FrameBuffer::new(Size::zero());
        fb.clear(WHITE).unwrap();
        assert!(fb.dirty_area().is_none());

        fb.resize(Size::new(10, 6));
        assert_eq!(fb.size(), Size::new(10, 6));
        assert_eq!(
            fb.dirty_area(),
            Some(Rectangle::new(Point::zero(), Size::new(10, 6)))
        );
    }
}
