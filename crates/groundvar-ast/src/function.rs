//! Decompiled functions and their variables

use groundvar_types::HostType;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{Address, NodeStream};

/// Where the host placed a variable
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StorageLocation {
    /// Host stack offset, before correcting by the function's stack delta
    Stack { stkoff: i64 },
    Register { reg: u16 },
    #[default]
    Unknown,
}

/// A variable's location relative to the frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameLocation {
    BpOffset(i64),
    Register(u16),
}

impl fmt::Display for FrameLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FrameLocation::BpOffset(offset) => write!(f, "BP offset {}", offset),
            FrameLocation::Register(reg) => write!(f, "Register {}", reg),
        }
    }
}

/// A local variable or argument of a decompiled function
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocalVar {
    pub name: String,
    /// Set when a human assigned the name, as opposed to a generated `v12`
    #[serde(default)]
    pub has_user_name: bool,
    #[serde(default)]
    pub is_arg: bool,
    #[serde(default)]
    pub ty: Option<HostType>,
    #[serde(default)]
    pub location: StorageLocation,
}

impl LocalVar {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            has_user_name: false,
            is_arg: false,
            ty: None,
            location: StorageLocation::Unknown,
        }
    }

    pub fn user_named(mut self) -> Self {
        self.has_user_name = true;
        self
    }

    pub fn argument(mut self) -> Self {
        self.is_arg = true;
        self
    }

    pub fn with_type(mut self, ty: HostType) -> Self {
        self.ty = Some(ty);
        self
    }

    pub fn at(mut self, location: StorageLocation) -> Self {
        self.location = location;
        self
    }

    /// Whether this variable counts as ground truth
    pub fn is_user_named(&self) -> bool {
        self.has_user_name && !self.name.is_empty()
    }
}

/// One successfully decompiled function
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecompiledFunction {
    pub entry: Address,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub frame_size: u64,
    #[serde(default)]
    pub stkoff_delta: i64,
    /// Every variable, arguments included, in host order
    #[serde(default)]
    pub variables: Vec<LocalVar>,
    #[serde(default)]
    pub nodes: NodeStream,
}

impl DecompiledFunction {
    pub fn new(entry: Address, name: impl Into<String>) -> Self {
        Self {
            entry,
            name: name.into(),
            frame_size: 0,
            stkoff_delta: 0,
            variables: Vec::new(),
            nodes: NodeStream::new(),
        }
    }

    pub fn arguments(&self) -> impl Iterator<Item = &LocalVar> {
        self.variables.iter().filter(|v| v.is_arg)
    }

    /// The host's local variable list, which includes the arguments
    pub fn locals(&self) -> impl Iterator<Item = &LocalVar> {
        self.variables.iter()
    }

    pub fn user_named(&self) -> impl Iterator<Item = &LocalVar> {
        self.variables.iter().filter(|v| v.is_user_named())
    }

    /// Names of the human-named variables, in host order
    pub fn user_named_names(&self) -> Vec<String> {
        self.user_named().map(|v| v.name.clone()).collect()
    }

    /// Location of `var` relative to the frame. `None` for unknown storage
    /// and for stack offsets that do not fit the frame arithmetic.
    pub fn frame_location(&self, var: &LocalVar) -> Option<FrameLocation> {
        match var.location {
            StorageLocation::Stack { stkoff } => {
                let frame_size = i64::try_from(self.frame_size).ok()?;
                let corrected = stkoff.checked_sub(self.stkoff_delta)?;
                frame_size.checked_sub(corrected).map(FrameLocation::BpOffset)
            }
            StorageLocation::Register { reg } => Some(FrameLocation::Register(reg)),
            StorageLocation::Unknown => None,
        }
    }
}
