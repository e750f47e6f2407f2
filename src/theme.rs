//! The house report template: every literal the annotator and the document
//! assembly use.

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeadingSpacing {
    pub before_pt: f32,
    pub after_pt: f32,
}

/// Page size and margins, in inches.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageGeometry {
    pub width_in: f32,
    pub height_in: f32,
    pub margin_top_in: f32,
    pub margin_bottom_in: f32,
    pub margin_left_in: f32,
    pub margin_right_in: f32,
}

impl Default for PageGeometry {
    fn default() -> Self {
        Self {
            width_in: 8.27,
            height_in: 11.69,
            margin_top_in: 0.59,
            margin_bottom_in: 0.59,
            margin_left_in: 1.0,
            margin_right_in: 1.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct HouseStyle {
    pub body_font: String,
    pub body_size: String,
    pub mono_font: String,
    pub mono_size: String,
    pub caption_size: String,
    pub caption_code_size: String,
    pub accent: String,
    pub link_color: String,
    pub heading_color: String,
    pub subheading_color: String,
    /// Font sizes for `h1`..`h4`.
    pub heading_sizes: [String; 4],
    pub zebra_fill: String,
    pub code_border: String,
    pub image_width: String,
    pub image_border: String,
    pub summary_rule: String,
    pub summary_label_width: String,
    pub summary_value_width: String,
    pub reqres_title: String,
    pub reqres_header_size: String,
    pub reqres_key_width: String,
    pub reqres_body_width: String,
    pub reqres_rule: String,
    pub page: PageGeometry,
    /// Spacing overrides for `h1`..`h4`.
    pub heading_spacing: [HeadingSpacing; 4],
    pub paragraph_space_before_pt: f32,
    pub line_spacing: f32,
}

impl Default for HouseStyle {
    fn default() -> Self {
        Self {
            body_font: "Calibri".into(),
            body_size: "11pt".into(),
            mono_font: "Roboto Mono".into(),
            mono_size: "9pt".into(),
            caption_size: "10pt".into(),
            caption_code_size: "8pt".into(),
            accent: "#057d9f".into(),
            link_color: "#1155cc".into(),
            heading_color: "#666666".into(),
            subheading_color: "#434343".into(),
            heading_sizes: ["20pt".into(), "18pt".into(), "14pt".into(), "12pt".into()],
            zebra_fill: "#efefef".into(),
            code_border: "1px solid #000000".into(),
            image_width: "450pt".into(),
            image_border: "1px solid #000000".into(),
            summary_rule: "6px solid #057d9f".into(),
            summary_label_width: "82.512pt".into(),
            summary_value_width: "367.488pt".into(),
            reqres_title: "Example".into(),
            reqres_header_size: "12pt".into(),
            reqres_key_width: "120pt".into(),
            reqres_body_width: "330pt".into(),
            reqres_rule: "1px solid #057d9f".into(),
            page: PageGeometry::default(),
            heading_spacing: [
                HeadingSpacing { before_pt: 20.0, after_pt: 6.0 },
                HeadingSpacing { before_pt: 18.0, after_pt: 6.0 },
                HeadingSpacing { before_pt: 16.0, after_pt: 4.0 },
                HeadingSpacing { before_pt: 14.0, after_pt: 4.0 },
            ],
            paragraph_space_before_pt: 1.0,
            line_spacing: 1.15,
        }
    }
}

impl HouseStyle {
    pub fn heading_size(&self, level: u8) -> &str {
        &self.heading_sizes[usize::from(level.clamp(1, 4)) - 1]
    }

    pub fn heading_spacing(&self, level: u8) -> HeadingSpacing {
        self.heading_spacing[usize::from(level.clamp(1, 4)) - 1]
    }
}
