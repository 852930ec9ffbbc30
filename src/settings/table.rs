//! The settings schema, as plain data.
//!
//! Every persisted field is a choice between a fixed set of `u32` values,
//! each with the string it is displayed and stored as.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDescriptor {
    /// Key in the settings file.
    pub name: &'static str,
    /// Human-facing name, used in logs.
    pub label: &'static str,
    pub help: &'static str,
    pub default: u32,
    pub values: &'static [u32],
    /// `strings[i]` is how `values[i]` is shown and stored.
    pub strings: &'static [&'static str],
}

impl FieldDescriptor {
    pub fn value_index(&self, value: u32) -> Option<usize> {
        self.values.iter().position(|v| *v == value)
    }

    pub fn is_allowed(&self, value: u32) -> bool {
        self.value_index(value).is_some()
    }

    /// String for `value`, or for the default if `value` isn't one of ours.
    pub fn string_for(&self, value: u32) -> &'static str {
        let index = self
            .value_index(value)
            .or_else(|| self.value_index(self.default))
            .unwrap_or_default();
        self.strings[index]
    }

    /// Value whose string matches `s`, ignoring ASCII case.
    pub fn parse(&self, s: &str) -> Option<u32> {
        let index = self
            .strings
            .iter()
            .position(|candidate| candidate.eq_ignore_ascii_case(s.trim()))?;
        Some(self.values[index])
    }
}

pub const DISPLAY_MODE: &str = "display_mode";
pub const BAUD_RATE: &str = "baud_rate";
pub const DATA_BITS: &str = "data_bits";
pub const PARITY: &str = "parity";
pub const STOP_BITS: &str = "stop_bits";
pub const FLOW_CONTROL: &str = "flow_control";
pub const CAPACITY: &str = "capacity";

/// All fields, in the order they're logged and written out.
pub const FIELDS: &[FieldDescriptor] = &[
    FieldDescriptor {
        name: DISPLAY_MODE,
        label: "Display Mode",
        help: "How received bytes are drawn",
        default: 0,
        values: &[0, 1, 2],
        strings: &["Auto", "Hex", "Binary"],
    },
    FieldDescriptor {
        name: BAUD_RATE,
        label: "Baud Rate",
        help: "Line speed of the capture port",
        default: 115200,
        values: &[9600, 19200, 38400, 57600, 115200, 230400, 460800, 921600],
        strings: &[
            "9600", "19200", "38400", "57600", "115200", "230400", "460800", "921600",
        ],
    },
    FieldDescriptor {
        name: DATA_BITS,
        label: "Data Bits",
        help: "Bits per character on the capture port",
        default: 8,
        values: &[5, 6, 7, 8],
        strings: &["5", "6", "7", "8"],
    },
    FieldDescriptor {
        name: PARITY,
        label: "Parity",
        help: "Parity checking on the capture port",
        default: 0,
        values: &[0, 1, 2],
        strings: &["None", "Odd", "Even"],
    },
    FieldDescriptor {
        name: STOP_BITS,
        label: "Stop Bits",
        help: "Stop bits per character on the capture port",
        default: 1,
        values: &[1, 2],
        strings: &["1", "2"],
    },
    FieldDescriptor {
        name: FLOW_CONTROL,
        label: "Flow Control",
        help: "Flow control on the capture port",
        default: 0,
        values: &[0, 1, 2],
        strings: &["None", "Software", "Hardware"],
    },
    FieldDescriptor {
        name: CAPACITY,
        label: "Buffer Size",
        help: "How many of the latest bytes are kept for scrolling",
        default: 4096,
        values: &[1024, 2048, 4096, 8192, 16384, 65536],
        strings: &["1K", "2K", "4K", "8K", "16K", "64K"],
    },
];

pub fn descriptor(name: &str) -> Option<&'static FieldDescriptor> {
    FIELDS.iter().find(|field| field.name == name)
}
