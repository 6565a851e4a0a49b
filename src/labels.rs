use core::fmt;

/// CIFAR-10 class names, indexed by class id.
pub const CIFAR10_LABELS: [&str; 10] = [
    "airplane",
    "automobile",
    "bird",
    "cat",
    "deer",
    "dog",
    "frog",
    "horse",
    "ship",
    "truck",
];

pub const NUM_CLASSES: usize = CIFAR10_LABELS.len();

/// Label shown when a class id has no name.
pub const UNKNOWN_LABEL: &str = "unknown";

/// Looks up the name of a class id, falling back to [`UNKNOWN_LABEL`].
pub fn label_for(class: usize) -> &'static str {
    CIFAR10_LABELS.get(class).copied().unwrap_or(UNKNOWN_LABEL)
}

/// Index of the largest value. Ties resolve to the lowest index and NaNs never win.
pub fn argmax(values: &[f32]) -> Option<usize> {
    let mut best: Option<(usize, f32)> = None;

    for (index, &value) in values.iter().enumerate() {
        if value.is_nan() {
            continue;
        }
        match best {
            Some((_, max)) if value <= max => {}
            _ => best = Some((index, value)),
        }
    }

    best.map(|(index, _)| index)
}

/// Decoded classifier output.
#[derive(Clone, Debug, PartialEq)]
pub struct Prediction {
    /// Argmax of the probabilities, `None` when there is nothing to pick from.
    pub class: Option<usize>,
    pub label: &'static str,
    pub probabilities: Vec<f32>,
}

impl Prediction {
    /// Decodes a probability vector ordered like [`CIFAR10_LABELS`].
    pub fn decode(probabilities: Vec<f32>) -> Self {
        let class = argmax(&probabilities);
        let label = class.map(label_for).unwrap_or(UNKNOWN_LABEL);

        Self {
            class,
            label,
            probabilities,
        }
    }

    /// Per-class percentages in label order.
    pub fn breakdown(&self) -> Breakdown<'_> {
        Breakdown {
            probabilities: &self.probabilities,
        }
    }
}

/// One `"<name> : <percent>%"` line per probability.
pub struct Breakdown<'a> {
    probabilities: &'a [f32],
}

impl fmt::Display for Breakdown<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (class, probability) in self.probabilities.iter().enumerate() {
            writeln!(f, "{} : {:.2}%", label_for(class), probability * 100.0)?;
        }
        Ok(())
    }
}
