use fraktal_core::{validate_iteration_limit, Complex, FractalParams, Viewpoint};
use fraktal_render::{Gradient, Rgb};

use crate::error::SettingsError;
use crate::settings::Settings;

/// A named starting point: view, family, iteration limit and gradient.
///
/// The zoom is stored per pixel so a preset frames the same detail at any
/// window size.
#[derive(Debug, Clone, PartialEq)]
pub struct Preset {
    pub name: &'static str,
    pub fractal: FractalParams,
    pub center: Complex,
    pub pixel_size: f64,
    pub iteration_limit: u32,
    pub inside: &'static str,
    pub stops: &'static [(u32, &'static str)],
}

impl Preset {
    /// Build full settings for a `width × height` viewport.
    ///
    /// Pivots beyond the preset's iteration limit are clamped to it.
    pub fn settings(&self, width: u32, height: u32) -> Result<Settings, SettingsError> {
        let viewpoint = Viewpoint::new(
            self.center,
            self.pixel_size * width as f64,
            width,
            height,
        )?;
        let iteration_limit = validate_iteration_limit(self.iteration_limit)?;

        let stops = self
            .stops
            .iter()
            .map(|&(value, hex)| Ok((value, Rgb::parse_hex(hex)?)))
            .collect::<fraktal_render::Result<Vec<_>>>()?;
        let mut gradient = Gradient::new(stops, Rgb::parse_hex(self.inside)?)?;
        gradient.clamp_to(iteration_limit);

        Ok(Settings {
            viewpoint,
            fractal: self.fractal,
            iteration_limit,
            gradient,
        })
    }
}

/// Look up a preset by name, ignoring ASCII case.
pub fn find(name: &str) -> Option<&'static Preset> {
    PRESETS
        .iter()
        .find(|preset| preset.name.eq_ignore_ascii_case(name.trim()))
}

pub static PRESETS: [Preset; 11] = [
    Preset {
        name: "Classic",
        fractal: FractalParams::Mandelbrot,
        center: Complex::new(-0.5, 0.0),
        pixel_size: 0.003_906_25,
        iteration_limit: 200,
        inside: "#000000",
        stops: &[
            (0, "#000000"),
            (23, "#4c00ff"),
            (97, "#ffff00"),
            (200, "#ffffff"),
        ],
    },
    Preset {
        name: "Seahorse valley",
        fractal: FractalParams::Mandelbrot,
        center: Complex::new(-0.7453, 0.1127),
        pixel_size: 1.5e-5,
        iteration_limit: 400,
        inside: "#000000",
        stops: &[
            (0, "#000022"),
            (40, "#1f6fbf"),
            (120, "#ffe28a"),
            (400, "#ffffff"),
        ],
    },
    Preset {
        name: "Hyperspace",
        fractal: FractalParams::Mandelbrot,
        center: Complex::new(-0.562_199_084_321_036_9, 0.642_864_214_838_482_4),
        pixel_size: 2.328_306_436_538_696_3e-10,
        iteration_limit: 6400,
        inside: "#ffffff",
        stops: &[
            (0, "#000000"),
            (191, "#260048"),
            (272, "#00ffe5"),
            (370, "#002c4c"),
            (784, "#90bedf"),
            (6400, "#ffffff"),
        ],
    },
    Preset {
        name: "My burning heart",
        fractal: FractalParams::Mandelbrot,
        center: Complex::new(-0.174_597_731_223_596_45, -1.071_587_968_815_894_7),
        pixel_size: 1.019_376_304_801_67e-6,
        iteration_limit: 3200,
        inside: "#000000",
        stops: &[
            (0, "#000000"),
            (79, "#7f0000"),
            (347, "#bf7f00"),
            (3200, "#ffff00"),
        ],
    },
    Preset {
        name: "Poseidon's armory",
        fractal: FractalParams::Mandelbrot,
        center: Complex::new(-1.539_065_179_658_913_4, -7.974_239_873_373_654e-13),
        pixel_size: 6.075_956_254_015_386e-14,
        iteration_limit: 6400,
        inside: "#000000",
        stops: &[
            (232, "#000000"),
            (414, "#007f4b"),
            (792, "#cec800"),
            (2450, "#67e37f"),
            (6400, "#00ffff"),
        ],
    },
    Preset {
        name: "The Radiance",
        fractal: FractalParams::Mandelbrot,
        center: Complex::new(-0.342_291_402_739_286_2, 0.632_076_164_233_232_5),
        pixel_size: 1.555_444_801_027_939e-11,
        iteration_limit: 6400,
        inside: "#ffffff",
        stops: &[
            (0, "#000000"),
            (622, "#002e57"),
            (963, "#fff700"),
            (1766, "#002e57"),
            (1914, "#0063bc"),
            (2913, "#62ffff"),
            (3596, "#fff56d"),
            (6400, "#ffffff"),
        ],
    },
    Preset {
        name: "Singularity",
        fractal: FractalParams::Mandelbrot,
        center: Complex::new(-0.342_319_792_157_834_37, 0.632_049_777_465_42),
        pixel_size: 1.019_376_304_801_67e-6,
        iteration_limit: 1600,
        inside: "#000000",
        stops: &[
            (0, "#000000"),
            (143, "#007f7f"),
            (216, "#00ffff"),
            (332, "#c5ffff"),
            (1599, "#ffffff"),
        ],
    },
    Preset {
        name: "The day they came",
        fractal: FractalParams::Mandelbrot,
        center: Complex::new(-0.258_301_746_175_536_86, 0.656_213_318_194_850_2),
        pixel_size: 7.594_945_317_519_233e-15,
        iteration_limit: 1002,
        inside: "#000000",
        stops: &[(906, "#000000"), (959, "#007f00"), (1002, "#ffff00")],
    },
    Preset {
        name: "Wildfire",
        fractal: FractalParams::Mandelbrot,
        center: Complex::new(-0.131_504_058_837_890_62, 0.840_011_596_679_687_5),
        pixel_size: 3.814_697_265_625e-6,
        iteration_limit: 12800,
        inside: "#000000",
        stops: &[
            (0, "#000000"),
            (305, "#99000e"),
            (1613, "#ca7f07"),
            (12800, "#ffff00"),
        ],
    },
    Preset {
        name: "Julia dendrite",
        fractal: FractalParams::Julia {
            c: Complex::new(0.0, 1.0),
        },
        center: Complex::new(0.0, 0.0),
        pixel_size: 0.004_375,
        iteration_limit: 300,
        inside: "#000000",
        stops: &[(0, "#000000"), (12, "#3a0ca3"), (60, "#f72585"), (299, "#ffffff")],
    },
    Preset {
        name: "Douady rabbit",
        fractal: FractalParams::Julia {
            c: Complex::new(-0.123, 0.745),
        },
        center: Complex::new(0.0, 0.0),
        pixel_size: 0.004_375,
        iteration_limit: 200,
        inside: "#0b132b",
        stops: &[(0, "#000000"), (8, "#1c2541"), (30, "#5bc0be"), (199, "#ffffff")],
    },
];
