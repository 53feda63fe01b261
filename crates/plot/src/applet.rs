use numera_core::Family;
use serde::Serialize;

/// Embed parameters for the graphing applet, serialized with the applet's
/// own key names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppletConfig {
    pub app_name: String,
    pub width: u32,
    pub height: u32,
    pub show_tool_bar: bool,
    pub show_algebra_input: bool,
    pub show_menu_bar: bool,
    pub enable_right_click: bool,
    pub enable_shift_drag_zoom: bool,
    pub show_reset_icon: bool,
    pub language: String,
    pub show_zoom_buttons: bool,
    pub enable_file_features: bool,
}

impl AppletConfig {
    /// The preset used by pages of the given family.
    #[must_use]
    pub fn for_family(family: Family) -> Self {
        match family {
            Family::RootFinding => Self::preset(800, 400, false, true),
            Family::LinearSystem => Self::preset(850, 450, true, false),
            Family::Interpolation => Self::preset(800, 450, true, false),
        }
    }

    /// The preset used by the standalone function graph.
    #[must_use]
    pub fn graphing() -> Self {
        Self::preset(800, 450, false, true)
    }

    fn preset(width: u32, height: u32, algebra_input: bool, reset_icon: bool) -> Self {
        Self {
            app_name: "graphing".to_owned(),
            width,
            height,
            show_tool_bar: false,
            show_algebra_input: algebra_input,
            show_menu_bar: false,
            enable_right_click: false,
            enable_shift_drag_zoom: true,
            show_reset_icon: reset_icon,
            language: "es".to_owned(),
            show_zoom_buttons: true,
            enable_file_features: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use serde_json::json;

    #[test]
    fn root_finding_preset_uses_applet_key_names() {
        let value = serde_json::to_value(AppletConfig::for_family(Family::RootFinding)).unwrap();
        assert_eq!(
            value,
            json!({
                "appName": "graphing",
                "width": 800,
                "height": 400,
                "showToolBar": false,
                "showAlgebraInput": false,
                "showMenuBar": false,
                "enableRightClick": false,
                "enableShiftDragZoom": true,
                "showResetIcon": true,
                "language": "es",
                "showZoomButtons": true,
                "enableFileFeatures": true
            })
        );
    }

    #[test]
    fn system_and_interpolation_presets_show_algebra_input() {
        let linear = AppletConfig::for_family(Family::LinearSystem);
        let interpolation = AppletConfig::for_family(Family::Interpolation);
        assert_eq!((linear.width, linear.height), (850, 450));
        assert_eq!((interpolation.width, interpolation.height), (800, 450));
        assert!(linear.show_algebra_input && interpolation.show_algebra_input);
        assert!(!linear.show_reset_icon);
    }

    #[test]
    fn graphing_preset_hides_algebra_input() {
        let graphing = AppletConfig::graphing();
        assert_eq!((graphing.width, graphing.height), (800, 450));
        assert!(!graphing.show_algebra_input);
        assert!(graphing.show_reset_icon);
    }
}
