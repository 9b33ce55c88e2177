//! Canny edge detector
//!
//! 3x3 Sobel gradients with replicated borders, L1 magnitude, non-maximum
//! suppression along four quantized directions, then hysteresis that grows
//! strong edges through 8-connected weak pixels.

use image::GrayImage;

use super::replicate;

/// tan(22.5°) and tan(67.5°) for direction binning
const TAN_22_5: f32 = 0.414_213_57;
const TAN_67_5: f32 = 2.414_213_6;

const NONE: u8 = 0;
const WEAK: u8 = 1;
const STRONG: u8 = 2;

struct Gradients {
    width: usize,
    height: usize,
    gx: Vec<i32>,
    gy: Vec<i32>,
    magnitude: Vec<f32>,
}

impl Gradients {
    fn sobel(image: &GrayImage) -> Self {
        let (w, h) = image.dimensions();
        let (width, height) = (w as usize, h as usize);
        let at = |x: i64, y: i64| i32::from(image.get_pixel(replicate(x, w), replicate(y, h)).0[0]);

        let mut gx = vec![0i32; width * height];
        let mut gy = vec![0i32; width * height];
        let mut magnitude = vec![0f32; width * height];
        for y in 0..i64::from(h) {
            for x in 0..i64::from(w) {
                let dx = (at(x + 1, y - 1) + 2 * at(x + 1, y) + at(x + 1, y + 1))
                    - (at(x - 1, y - 1) + 2 * at(x - 1, y) + at(x - 1, y + 1));
                let dy = (at(x - 1, y + 1) + 2 * at(x, y + 1) + at(x + 1, y + 1))
                    - (at(x - 1, y - 1) + 2 * at(x, y - 1) + at(x + 1, y - 1));
                let i = y as usize * width + x as usize;
                gx[i] = dx;
                gy[i] = dy;
                magnitude[i] = (dx.abs() + dy.abs()) as f32;
            }
        }
        Self {
            width,
            height,
            gx,
            gy,
            magnitude,
        }
    }

    /// Magnitude at an offset, 0 outside the image
    fn magnitude_at(&self, x: usize, y: usize, dx: isize, dy: isize) -> f32 {
        let nx = x as isize + dx;
        let ny = y as isize + dy;
        if nx < 0 || ny < 0 || nx as usize >= self.width || ny as usize >= self.height {
            return 0.0;
        }
        self.magnitude[ny as usize * self.width + nx as usize]
    }

    /// Neighbor offsets across the edge at `i`
    fn across(&self, i: usize) -> (isize, isize) {
        let (gx, gy) = (self.gx[i] as f32, self.gy[i] as f32);
        let (ax, ay) = (gx.abs(), gy.abs());
        if ay <= ax * TAN_22_5 {
            (1, 0)
        } else if ay >= ax * TAN_67_5 {
            (0, 1)
        } else if (gx > 0.0) == (gy > 0.0) {
            (1, 1)
        } else {
            (1, -1)
        }
    }
}

/// Binary edge map (0/255) of `image`.
///
/// Pixels above `high` seed edges; pixels above `low` join an edge when
/// 8-connected to one. `low` and `high` are swapped if given reversed.
pub fn canny(image: &GrayImage, low: f32, high: f32) -> GrayImage {
    let (w, h) = image.dimensions();
    let mut out = GrayImage::new(w, h);
    if w == 0 || h == 0 {
        return out;
    }
    let (low, high) = if low <= high { (low, high) } else { (high, low) };

    let grad = Gradients::sobel(image);
    let (width, height) = (grad.width, grad.height);

    let mut class = vec![NONE; width * height];
    let mut stack = Vec::new();
    for y in 0..height {
        for x in 0..width {
            let i = y * width + x;
            let m = grad.magnitude[i];
            if m <= low {
                continue;
            }
            let (dx, dy) = grad.across(i);
            let ahead = grad.magnitude_at(x, y, dx, dy);
            let behind = grad.magnitude_at(x, y, -dx, -dy);
            if !(m > behind && m >= ahead) {
                continue;
            }
            if m > high {
                class[i] = STRONG;
                stack.push(i);
            } else {
                class[i] = WEAK;
            }
        }
    }

    while let Some(i) = stack.pop() {
        let (x, y) = ((i % width) as isize, (i / width) as isize);
        for dy in -1..=1isize {
            for dx in -1..=1isize {
                let (nx, ny) = (x + dx, y + dy);
                if nx < 0 || ny < 0 || nx as usize >= width || ny as usize >= height {
                    continue;
                }
                let n = ny as usize * width + nx as usize;
                if class[n] == WEAK {
                    class[n] = STRONG;
                    stack.push(n);
                }
            }
        }
    }

    for (pixel, &c) in out.pixels_mut().zip(&class) {
        if c == STRONG {
            pixel.0[0] = 255;
        }
    }
    out
}
