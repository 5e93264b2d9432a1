//! Static catalog of known objects and the keyword table that routes raw
//! classifier labels to them.

use std::sync::LazyLock;
use xray_lens_types::{CatalogRecord, ComponentRecord};

/// Trigger substrings for one catalog key
#[derive(Debug, Clone, Copy)]
pub struct KeywordGroup {
    pub key: &'static str,
    pub triggers: &'static [&'static str],
}

impl KeywordGroup {
    /// `lowered` must already be lower-cased
    pub fn matches(&self, lowered: &str) -> bool {
        self.triggers.iter().any(|t| lowered.contains(t))
    }
}

/// Checked in order; the first group that matches a label wins
pub static KEYWORD_GROUPS: &[KeywordGroup] = &[
    KeywordGroup {
        key: "mouse",
        triggers: &["mouse"],
    },
    KeywordGroup {
        key: "phone",
        triggers: &["cellular", "phone", "smartphone", "iphone", "ipod"],
    },
    KeywordGroup {
        key: "lightbulb",
        triggers: &["light", "bulb", "lamp", "lantern", "torch"],
    },
    KeywordGroup {
        key: "keyboard",
        triggers: &["keyboard", "typewriter"],
    },
    KeywordGroup {
        key: "bottle",
        triggers: &["bottle", "flask"],
    },
    KeywordGroup {
        key: "cup",
        triggers: &["cup", "mug", "coffee", "espresso"],
    },
    KeywordGroup {
        key: "laptop",
        triggers: &["laptop", "notebook"],
    },
    KeywordGroup {
        key: "watch",
        triggers: &["watch", "clock"],
    },
];

static CATALOG: LazyLock<Vec<CatalogRecord>> = LazyLock::new(|| {
    vec![
        CatalogRecord::new(
            "lightbulb",
            "Incandescent Light Bulb",
            "A classic electric light with a wire filament heated until it glows.",
            vec![
                ComponentRecord::new("1", "Filament", "Tungsten wire that glows when heated.", (50.0, 30.0)),
                ComponentRecord::new("2", "Glass Bulb", "Protects the filament from oxidation.", (50.0, 10.0)),
                ComponentRecord::new("3", "Base", "Connects to the electrical supply.", (50.0, 80.0)),
            ],
        ),
        CatalogRecord::new(
            "mouse",
            "Computer Mouse",
            "Hand-held pointing device that detects two-dimensional motion.",
            vec![
                ComponentRecord::new("1", "Scroll Wheel", "Used for scrolling content.", (50.0, 20.0)),
                ComponentRecord::new("2", "Left Click Switch", "Primary selection button.", (30.0, 30.0)),
                ComponentRecord::new("3", "Optical Sensor", "Detects movement relative to a surface.", (50.0, 60.0)),
            ],
        ),
        CatalogRecord::new(
            "phone",
            "Smartphone",
            "Portable computer with a touchscreen interface.",
            vec![
                ComponentRecord::new("1", "SoC (Processor)", "The brain of the device.", (50.0, 40.0)),
                ComponentRecord::new("2", "Battery", "Provides power to the components.", (50.0, 60.0)),
                ComponentRecord::new("3", "Camera Module", "Captures photos and videos.", (70.0, 15.0)),
            ],
        ),
        CatalogRecord::new(
            "keyboard",
            "Computer Keyboard",
            "Input device used to enter characters and functions into the computer system.",
            vec![
                ComponentRecord::new("1", "Key Switches", "Mechanisms under the keys that register presses.", (50.0, 50.0)),
                ComponentRecord::new("2", "Controller", "Scans the key matrix and sends data to the computer.", (80.0, 20.0)),
            ],
        ),
        CatalogRecord::new(
            "bottle",
            "Water Bottle",
            "A container that is used to hold water, liquids or other beverages.",
            vec![
                ComponentRecord::new("1", "Cap", "Seals the bottle to prevent spilling.", (50.0, 10.0)),
                ComponentRecord::new("2", "Body", "Main container area.", (50.0, 50.0)),
            ],
        ),
        CatalogRecord::new(
            "cup",
            "Coffee Mug",
            "A cup typically used for drinking hot beverages such as coffee, hot chocolate or tea.",
            vec![
                ComponentRecord::new("1", "Handle", "Used to hold the mug when hot.", (80.0, 50.0)),
                ComponentRecord::new("2", "Rim", "The edge you drink from.", (50.0, 10.0)),
            ],
        ),
        CatalogRecord::new(
            "laptop",
            "Laptop Computer",
            "Portable personal computer with a screen and keyboard.",
            vec![
                ComponentRecord::new("1", "Screen", "Display panel.", (50.0, 20.0)),
                ComponentRecord::new("2", "Motherboard", "Main circuit board with CPU and RAM.", (50.0, 60.0)),
                ComponentRecord::new("3", "Battery", "Rechargeable power source.", (50.0, 80.0)),
            ],
        ),
        CatalogRecord::new(
            "watch",
            "Wristwatch",
            "Timekeeping device worn on the wrist.",
            vec![
                ComponentRecord::new("1", "Movement", "Internal mechanism that keeps time.", (50.0, 50.0)),
                ComponentRecord::new("2", "Crystal", "Protective glass over the dial.", (50.0, 30.0)),
            ],
        ),
    ]
});

pub fn lookup(key: &str) -> Option<&'static CatalogRecord> {
    CATALOG.iter().find(|record| record.id == key)
}

pub fn records() -> &'static [CatalogRecord] {
    CATALOG.as_slice()
}

pub fn keys() -> impl Iterator<Item = &'static str> {
    CATALOG.iter().map(|record| record.id.as_str())
}

/// First keyword group whose triggers occur in `label`, case-insensitive
pub fn match_keyword(label: &str) -> Option<&'static KeywordGroup> {
    let lowered = label.to_lowercase();
    KEYWORD_GROUPS.iter().find(|group| group.matches(&lowered))
}
