use tracing::debug;

/// Canonical channel slots mapped onto a file's own channel indices.
///
/// A slot without a native channel reads as an all-zero plane.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChannelMap {
    slots: Vec<Option<usize>>,
}

impl ChannelMap {
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Native channel index behind canonical slot `channel`.
    pub fn native(&self, channel: usize) -> Option<usize> {
        self.slots.get(channel).copied().flatten()
    }

    /// Canonical slots the file does not provide.
    pub fn missing(&self) -> Vec<usize> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| slot.is_none().then_some(i))
            .collect()
    }
}

/// Match channels by name, in canonical order.
pub fn reconcile_channels(canonical: &[String], file: &[String]) -> ChannelMap {
    let slots: Vec<Option<usize>> = canonical
        .iter()
        .map(|name| file.iter().position(|n| n == name))
        .collect();

    for (name, slot) in canonical.iter().zip(&slots) {
        if slot.is_none() {
            debug!(channel = %name, "Channel not acquired, zero-filling");
        }
    }
    ChannelMap { slots }
}
