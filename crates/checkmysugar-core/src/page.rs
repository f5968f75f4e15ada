//! # Page Module
//!
//! Renders the single CheckMySugar page.
//!
//! The page is one fixed template with three substitutions: the generated
//! input fields, the result banner (empty on GET), and the default color of
//! the `.result` rule. Every interpolated string is HTML-escaped.

use crate::predictor::Prediction;
use crate::schema::FeatureSchema;

/// Background for failure banners.
pub const WARNING_COLOR: &str = "#ff9800";

/// Fallback `.result` background used by the stylesheet.
pub const DEFAULT_RESULT_COLOR: &str = "#ccc";

/// Outcome shown under the form after a submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Banner {
    /// The model's answer.
    Diagnosis(Prediction),
    /// A user-facing failure message, rendered as `Error: <message>`.
    Failure(String),
}

impl Banner {
    /// Failure banner from any displayable error.
    pub fn failure(message: impl std::fmt::Display) -> Self {
        Self::Failure(message.to_string())
    }

    pub fn color(&self) -> &'static str {
        match self {
            Self::Diagnosis(prediction) => prediction.diagnosis.color(),
            Self::Failure(_) => WARNING_COLOR,
        }
    }

    pub fn text(&self) -> String {
        match self {
            Self::Diagnosis(prediction) => prediction.diagnosis.label().to_string(),
            Self::Failure(message) => format!("Error: {message}"),
        }
    }

    fn to_html(&self) -> String {
        format!(
            r#"<div class="result" style="background-color:{};">{}</div>"#,
            self.color(),
            escape_html(&self.text())
        )
    }
}

/// One label and numeric input per schema feature.
fn render_inputs(schema: &FeatureSchema) -> String {
    schema
        .features()
        .map(|f| {
            let name = escape_html(f.name);
            format!(
                r#"<label for="{name}">{}</label><input id="{name}" name="{name}" type="number" step="any" required>"#,
                escape_html(f.label)
            )
        })
        .collect::<Vec<_>>()
        .join("\n            ")
}

/// Render the full page, with a banner when one is given.
pub fn render_page(schema: &FeatureSchema, banner: Option<&Banner>) -> String {
    let inputs = render_inputs(schema);
    let result = banner.map(Banner::to_html).unwrap_or_default();
    let color = DEFAULT_RESULT_COLOR;

    format!(
        r#"<!doctype html>
<html>
<head>
    <meta charset="utf-8">
    <title>CheckMySugar</title>
    <style>
        body {{
            margin: 0;
            padding: 0;
            font-family: 'Segoe UI', sans-serif;
            background: linear-gradient(to right, #e3f2fd, #fce4ec);
            height: 100vh;
            display: flex;
            justify-content: center;
            align-items: center;
        }}
        .card {{
            background: #fff;
            padding: 40px 30px;
            border-radius: 16px;
            box-shadow: 0 12px 30px rgba(0,0,0,0.1);
            width: 100%;
            max-width: 400px;
        }}
        h2 {{
            text-align: center;
            color: #333;
            margin-bottom: 30px;
        }}
        label {{
            font-weight: 500;
            display: block;
            margin-top: 15px;
            margin-bottom: 5px;
            color: #444;
        }}
        input[type=number] {{
            width: 100%;
            padding: 10px;
            border-radius: 8px;
            border: 1px solid #ccc;
            transition: border-color 0.2s;
        }}
        input[type=number]:focus {{
            border-color: #2196f3;
            outline: none;
        }}
        input[type=submit] {{
            width: 100%;
            padding: 12px;
            background: #2196f3;
            color: white;
            border: none;
            border-radius: 8px;
            font-size: 16px;
            margin-top: 25px;
            cursor: pointer;
            transition: background 0.3s ease;
        }}
        input[type=submit]:hover {{
            background: #1976d2;
        }}
        .result {{
            margin-top: 20px;
            padding: 15px;
            text-align: center;
            border-radius: 8px;
            font-weight: bold;
            font-size: 18px;
            color: white;
            background-color: {color};
        }}
    </style>
</head>
<body>
    <div class="card">
        <h2>CheckMySugar</h2>
        <form method="post">
            {inputs}
            <input type="submit" value="Predict">
        </form>
        {result}
    </div>
</body>
</html>
"#
    )
}

/// Escape the five HTML-significant characters.
pub fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::predictor::Diagnosis;

    #[test]
    fn empty_page_has_seven_numeric_inputs_and_no_banner() {
        let html = render_page(&FeatureSchema::pima(), None);

        assert_eq!(html.matches(r#"type="number""#).count(), 7);
        assert_eq!(html.matches("<label").count(), 7);
        assert!(!html.contains(r#"class="result""#));
        assert!(html.contains(r#"<input type="submit" value="Predict">"#));
    }

    #[test]
    fn inputs_use_schema_names_and_labels() {
        let html = render_page(&FeatureSchema::pima(), None);

        for feature in FeatureSchema::pima().features() {
            assert!(html.contains(&format!(r#"name="{}""#, feature.name)));
        }
        assert!(html.contains("Genetic Risk Factor"));
        assert!(!html.contains("SkinThickness"));
    }

    #[test]
    fn default_color_fills_result_rule() {
        let html = render_page(&FeatureSchema::pima(), None);
        assert!(html.contains("background-color: #ccc;"));
    }

    #[test]
    fn diagnosis_banner_rendered() {
        let banner = Banner::Diagnosis(Prediction::new(Diagnosis::Diabetic, 80));
        let html = render_page(&FeatureSchema::pima(), Some(&banner));

        assert!(html.contains(r#"<div class="result" style="background-color:#e53935;">🟥 Diabetic</div>"#));
    }

    #[test]
    fn failure_banner_is_prefixed_and_escaped() {
        let banner = Banner::failure("<b>bad</b> & worse");
        let html = render_page(&FeatureSchema::pima(), Some(&banner));

        assert!(html.contains("Error: &lt;b&gt;bad&lt;/b&gt; &amp; worse"));
        assert!(html.contains("background-color:#ff9800;"));
        assert!(!html.contains("<b>bad</b>"));
    }

    #[test]
    fn escape_handles_quotes() {
        assert_eq!(escape_html(r#"a"b'c"#), "a&quot;b&#39;c");
        assert_eq!(escape_html("plain"), "plain");
    }
}
