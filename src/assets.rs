//! Built-in reference pictures.
//!
//! Pictures are procedural: a picture maps normalized coordinates
//! `(u, v) in [0, 1)²` to a colour, so any grid size can crop it without
//! resampling a bitmap.

use std::f32::consts::{PI, TAU};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub fn lerp(self, other: Rgb, t: f32) -> Rgb {
        let t = t.clamp(0.0, 1.0);
        let mix = |a: u8, b: u8| (a as f32 + (b as f32 - a as f32) * t).round() as u8;
        Rgb::new(mix(self.r, other.r), mix(self.g, other.g), mix(self.b, other.b))
    }

    /// Fully saturated colour for `hue` in turns, dimmed by `value`.
    fn from_hue(hue: f32, value: f32) -> Rgb {
        let h = hue.rem_euclid(1.0) * 6.0;
        let x = 1.0 - (h % 2.0 - 1.0).abs();
        let (r, g, b) = match h as u32 {
            0 => (1.0, x, 0.0),
            1 => (x, 1.0, 0.0),
            2 => (0.0, 1.0, x),
            3 => (0.0, x, 1.0),
            4 => (x, 0.0, 1.0),
            _ => (1.0, 0.0, x),
        };
        let v = value.clamp(0.0, 1.0) * 255.0;
        Rgb::new((r * v) as u8, (g * v) as u8, (b * v) as u8)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pattern {
    Sunset,
    Ocean,
    Forest,
    Checker,
    Rings,
    Stripes,
    Aurora,
    Desert,
    Night,
    Candy,
    Lava,
    Glacier,
    Meadow,
    Dusk,
    Prism,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Picture {
    pub name: &'static str,
    pattern: Pattern,
}

pub const PICTURES: [Picture; 15] = [
    Picture { name: "Sunset", pattern: Pattern::Sunset },
    Picture { name: "Ocean", pattern: Pattern::Ocean },
    Picture { name: "Forest", pattern: Pattern::Forest },
    Picture { name: "Checkerboard", pattern: Pattern::Checker },
    Picture { name: "Rings", pattern: Pattern::Rings },
    Picture { name: "Stripes", pattern: Pattern::Stripes },
    Picture { name: "Aurora", pattern: Pattern::Aurora },
    Picture { name: "Desert", pattern: Pattern::Desert },
    Picture { name: "Starry night", pattern: Pattern::Night },
    Picture { name: "Candy swirl", pattern: Pattern::Candy },
    Picture { name: "Lava", pattern: Pattern::Lava },
    Picture { name: "Glacier", pattern: Pattern::Glacier },
    Picture { name: "Meadow", pattern: Pattern::Meadow },
    Picture { name: "Dusk", pattern: Pattern::Dusk },
    Picture { name: "Prism", pattern: Pattern::Prism },
];

/// Cheap deterministic noise in `[0, 1)` for a lattice cell.
fn speckle(x: u32, y: u32) -> f32 {
    let mut h = x.wrapping_mul(0x9E37_79B1) ^ y.wrapping_mul(0x85EB_CA77);
    h ^= h >> 15;
    h = h.wrapping_mul(0x2C1B_3C6D);
    h ^= h >> 12;
    (h & 0xFFFF) as f32 / 65536.0
}

impl Picture {
    pub fn sample(&self, u: f32, v: f32) -> Rgb {
        let (u, v) = (u.clamp(0.0, 1.0), v.clamp(0.0, 1.0));

        match self.pattern {
            Pattern::Sunset => {
                let sky = Rgb::new(250, 140, 60).lerp(Rgb::new(110, 40, 120), 1.0 - v / 0.7);
                let sun = ((u - 0.5).powi(2) + (v - 0.55).powi(2)).sqrt() < 0.17;
                if v > 0.7 {
                    Rgb::new(40, 30, 70).lerp(Rgb::new(10, 10, 30), (v - 0.7) / 0.3)
                } else if sun {
                    Rgb::new(255, 220, 90)
                } else {
                    sky
                }
            }
            Pattern::Ocean => {
                let crest = 0.45 + 0.05 * (u * TAU * 2.0).sin();
                if v < crest {
                    Rgb::new(170, 215, 250).lerp(Rgb::new(90, 160, 230), v / crest)
                } else {
                    let swell = 0.5 + 0.5 * (u * TAU * 5.0 + v * 20.0).sin();
                    Rgb::new(20, 90, 160).lerp(Rgb::new(10, 40, 90), v).lerp(Rgb::new(40, 130, 190), swell * 0.3)
                }
            }
            Pattern::Forest => {
                let x = (u * 4.0).fract();
                let tree_top = 0.25 + (x - 0.5).abs() * 1.3;
                if v > 0.85 {
                    Rgb::new(90, 60, 30)
                } else if v > tree_top {
                    Rgb::new(20, 110, 40).lerp(Rgb::new(10, 60, 25), v)
                } else {
                    Rgb::new(200, 230, 250)
                }
            }
            Pattern::Checker => {
                let cell = (u * 4.0) as u32 + (v * 4.0) as u32;
                if cell % 2 == 0 {
                    Rgb::new(200, 40, 50)
                } else {
                    Rgb::new(245, 240, 230)
                }
            }
            Pattern::Rings => {
                let d = ((u - 0.5).powi(2) + (v - 0.5).powi(2)).sqrt();
                if (d * 12.0) as u32 % 2 == 0 {
                    Rgb::new(30, 60, 180)
                } else {
                    Rgb::new(250, 210, 60)
                }
            }
            Pattern::Stripes => {
                let band = ((u + v) * 5.0) as u32 % 3;
                match band {
                    0 => Rgb::new(240, 90, 80),
                    1 => Rgb::new(250, 240, 220),
                    _ => Rgb::new(50, 150, 140),
                }
            }
            Pattern::Aurora => {
                let curtain = 0.35 + 0.12 * (u * TAU * 1.5).sin();
                let glow = (1.0 - ((v - curtain).abs() * 6.0)).max(0.0);
                Rgb::new(8, 12, 40).lerp(Rgb::new(60, 240, 150), glow)
            }
            Pattern::Desert => {
                let dune = 0.6 + 0.08 * (u * TAU * 1.2).sin();
                if v > dune {
                    Rgb::new(230, 180, 100).lerp(Rgb::new(180, 120, 60), (v - dune) * 2.5)
                } else {
                    Rgb::new(120, 190, 240).lerp(Rgb::new(230, 220, 200), v / dune)
                }
            }
            Pattern::Night => {
                let star = speckle((u * 60.0) as u32, (v * 60.0) as u32) > 0.96;
                let moon = ((u - 0.75).powi(2) + (v - 0.25).powi(2)).sqrt() < 0.1;
                if moon {
                    Rgb::new(240, 240, 210)
                } else if star {
                    Rgb::new(255, 255, 255)
                } else {
                    Rgb::new(10, 15, 50).lerp(Rgb::new(30, 30, 90), v)
                }
            }
            Pattern::Candy => {
                let angle = (v - 0.5).atan2(u - 0.5) / TAU + 0.5;
                let d = ((u - 0.5).powi(2) + (v - 0.5).powi(2)).sqrt();
                if ((angle + d * 2.0) * 8.0) as u32 % 2 == 0 {
                    Rgb::new(240, 80, 150)
                } else {
                    Rgb::new(255, 235, 245)
                }
            }
            Pattern::Lava => {
                let heat = 0.5 + 0.25 * (u * PI * 6.0).sin() + 0.25 * (v * PI * 5.0 + u * 3.0).cos();
                Rgb::new(90, 10, 5)
                    .lerp(Rgb::new(230, 70, 10), heat * 1.4)
                    .lerp(Rgb::new(255, 220, 80), (heat - 0.7) * 3.0)
            }
            Pattern::Glacier => {
                let x = (u * 3.0).fract();
                let peak = 0.3 + (x - 0.5).abs() * 0.9;
                if v > peak {
                    Rgb::new(240, 250, 255).lerp(Rgb::new(120, 190, 220), (v - peak) * 1.5)
                } else {
                    Rgb::new(60, 110, 200).lerp(Rgb::new(170, 210, 245), v / peak)
                }
            }
            Pattern::Meadow => {
                if v < 0.4 {
                    Rgb::new(110, 180, 245).lerp(Rgb::new(200, 230, 250), v / 0.4)
                } else if speckle((u * 40.0) as u32, (v * 40.0) as u32) > 0.9 {
                    Rgb::from_hue(speckle((v * 40.0) as u32, (u * 40.0) as u32), 1.0)
                } else {
                    Rgb::new(90, 170, 60).lerp(Rgb::new(40, 110, 30), v)
                }
            }
            Pattern::Dusk => {
                let band = (v * 6.0) as u32;
                Rgb::new(40, 20, 80).lerp(Rgb::new(250, 150, 120), band as f32 / 5.0)
            }
            Pattern::Prism => Rgb::from_hue(u, 1.0 - v * 0.6),
        }
    }
}

/// Maps a point inside a tile to picture coordinates. `fx` and `fy` are in
/// `[0, 1)` relative to the tile; the crop is taken from the tile's home
/// cell, not from where it currently sits.
pub fn crop(grid_size: usize, home: usize, fx: f32, fy: f32) -> (f32, f32) {
    let grid = grid_size.max(1);
    let (row, col) = (home / grid, home % grid);
    (
        (col as f32 + fx) / grid as f32,
        (row as f32 + fy) / grid as f32,
    )
}

#[derive(Debug, Clone, Copy)]
pub struct Catalog {
    pictures: &'static [Picture],
}

impl Default for Catalog {
    fn default() -> Self {
        Self::builtin()
    }
}

impl Catalog {
    pub fn builtin() -> Self {
        Self { pictures: &PICTURES }
    }

    pub fn len(&self) -> usize {
        self.pictures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pictures.is_empty()
    }

    /// Picture for `index`, wrapping around the catalog.
    pub fn get(&self, index: usize) -> &Picture {
        &self.pictures[index % self.pictures.len()]
    }
}
