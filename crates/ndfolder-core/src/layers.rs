use serde::{Deserialize, Serialize};

use crate::consts::{OVERLAY_LAYER_OPACITY, PRIMARY_LAYER_OPACITY};

/// Colormap of a channel layer in the display host.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum LayerColor {
    Green,
    Blue,
    Gray,
}

impl std::fmt::Display for LayerColor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Green => write!(f, "green"),
            Self::Blue => write!(f, "blue"),
            Self::Gray => write!(f, "gray"),
        }
    }
}

pub fn color_from_name(name: &str) -> LayerColor {
    if name.contains("GFP") || name.contains("epi") {
        LayerColor::Green
    } else if name.contains("mRuby") {
        LayerColor::Blue
    } else if name.contains("brightfield") || name.contains("Brightfield") {
        LayerColor::Gray
    } else {
        LayerColor::Blue
    }
}

/// One display layer per canonical channel.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ChannelLayer {
    pub name: String,
    /// Index into the channel axis of the folder stack.
    pub channel: usize,
    pub color: LayerColor,
    pub opacity: f32,
}

/// Layers in channel order; the first is opaque, the rest blend over it.
pub fn channel_layers(channel_names: &[String]) -> Vec<ChannelLayer> {
    channel_names
        .iter()
        .enumerate()
        .map(|(channel, name)| ChannelLayer {
            name: name.clone(),
            channel,
            color: color_from_name(name),
            opacity: if channel == 0 {
                PRIMARY_LAYER_OPACITY
            } else {
                OVERLAY_LAYER_OPACITY
            },
        })
        .collect()
}
