#![cfg(all(feature = "headless", not(feature = "winit")))]
use flint::core::time::Duration;
use flint::core::widget::Group;
use flint::{Rectangle, Settings, Size, window};

#[test]
fn the_default_backend_shows_windows() {
    let mut toolkit = flint::toolkit(Settings::default()).expect("toolkit");

    let root = Group::new(Rectangle::new(0, 0, 200, 100));
    let main = toolkit.add_window(window::Settings::new("main", Size::new(200, 100)), root);

    assert!(toolkit.show(main));
    assert!(toolkit.native(main).is_some());

    let _ = toolkit.wait(Duration::ZERO);

    assert!(toolkit.platform().frames() > 0);
}

#[test]
fn invalid_settings_fail_fast() {
    let settings = Settings {
        scale: Some(0.0),
        ..Settings::default()
    };

    assert!(matches!(
        flint::toolkit(settings),
        Err(flint::Error::Settings(_))
    ));
}
