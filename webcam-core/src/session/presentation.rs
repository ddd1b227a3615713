use std::fmt;

use crate::models::config::Dimension;
use crate::models::media_models::PlaybackHandle;

/// Props of the playback element the widget renders.
#[derive(Debug, Clone, PartialEq)]
pub struct VideoElementProps {
    pub auto_play: bool,
    pub width: Dimension,
    pub height: Dimension,
    pub muted: bool,
    pub src: Option<PlaybackHandle>,
    pub class_name: Option<String>,
}

impl fmt::Display for VideoElementProps {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("<video")?;
        if self.auto_play {
            f.write_str(" autoplay")?;
        }
        write!(
            f,
            " width=\"{}\" height=\"{}\"",
            escape_attr(&self.width.to_string()),
            escape_attr(&self.height.to_string())
        )?;
        if self.muted {
            f.write_str(" muted")?;
        }
        if let Some(src) = &self.src {
            write!(f, " src=\"{}\"", escape_attr(src.as_str()))?;
        }
        if let Some(class_name) = &self.class_name {
            write!(f, " class=\"{}\"", escape_attr(class_name))?;
        }
        f.write_str("></video>")
    }
}

/// Escape a value for a double-quoted HTML attribute.
fn escape_attr(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '"' => escaped.push_str("&quot;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
