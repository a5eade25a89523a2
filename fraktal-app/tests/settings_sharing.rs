use fraktal_app::{presets, Session, Settings, SettingsError, PRESETS};
use fraktal_core::{Complex, CoreError};
use fraktal_render::Throttle;

#[test]
fn every_preset_round_trips_through_the_string_form() {
    for preset in &PRESETS {
        let settings = preset.settings(800, 600).unwrap();
        let encoded = settings.serialize().unwrap();
        let decoded = Settings::deserialize(&encoded)
            .unwrap_or_else(|e| panic!("{}: {e}", preset.name));
        assert_eq!(decoded, settings, "{}", preset.name);
        assert_eq!(decoded.serialize().unwrap(), encoded, "{}", preset.name);
    }
}

#[test]
fn deep_preset_keeps_exact_center() {
    let preset = presets::find("Poseidon's armory").unwrap();
    let settings = preset.settings(1024, 768).unwrap();
    let decoded = Settings::deserialize(&settings.serialize().unwrap()).unwrap();
    assert_eq!(
        decoded.viewpoint.center.im.to_bits(),
        Complex::new(0.0, -7.974_239_873_373_654e-13).im.to_bits()
    );
}

#[test]
fn shared_string_reproduces_the_same_pixels() {
    let preset = presets::find("Julia dendrite").unwrap();
    let mut a = Session::new(preset.settings(24, 18).unwrap(), Throttle::default()).unwrap();
    a.zoom_in_around(5.0, 7.0).unwrap();
    a.set_pivot_color(1, "#20c0ff").unwrap();
    let shared = a.serialize_settings().unwrap();

    let mut b = Session::new(Settings::default(), Throttle::default()).unwrap();
    assert!(b.restore(&shared).is_some());

    for session in [&mut a, &mut b] {
        let mut done = false;
        for _ in 0..10_000 {
            if session.frame().completed {
                done = true;
                break;
            }
        }
        assert!(done);
    }
    assert_eq!(a.pixels(), b.pixels());
}

#[test]
fn typed_failures() {
    assert!(matches!(
        Settings::deserialize("2:e30"),
        Err(SettingsError::UnsupportedVersion(v)) if v == "2"
    ));
    assert!(matches!(
        Settings::deserialize("1:****"),
        Err(SettingsError::Base64(_))
    ));
    // "bnVsbA" is base64 for `null`.
    assert!(matches!(
        Settings::deserialize("1:bnVsbA"),
        Err(SettingsError::Json(_))
    ));
}

#[test]
fn session_rejects_unknown_family() {
    let mut session = Session::new(Settings::default(), Throttle::default()).unwrap();
    let err = session.set_fractal("tricorn", None).unwrap_err();
    assert!(matches!(
        err,
        fraktal_app::AppError::Core(CoreError::UnknownFractal(name)) if name == "tricorn"
    ));
    assert_eq!(session.settings(), &Settings::default());
}
