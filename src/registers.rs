use serde::{Deserialize, Serialize};

/// Register-class membership metadata from the registration collaborator:
/// class id (the index) to member register ids. Loaded once at startup and
/// only ever read afterwards; this crate never builds real tables itself.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterInfo {
    classes: Vec<Vec<u32>>,
}

impl RegisterInfo {
    pub fn new(mut classes: Vec<Vec<u32>>) -> Self {
        for members in &mut classes {
            members.sort_unstable();
            members.dedup();
        }
        Self { classes }
    }

    pub fn from_json_str(text: &str) -> Result<Self, serde_json::Error> {
        let classes: Vec<Vec<u32>> = serde_json::from_str(text)?;
        Ok(Self::new(classes))
    }

    pub fn num_classes(&self) -> usize {
        self.classes.len()
    }

    pub fn class(&self, id: u32) -> Option<&[u32]> {
        self.classes.get(id as usize).map(Vec::as_slice)
    }

    /// Is register `reg` a member of class `class`? Unknown classes contain
    /// nothing.
    pub fn class_contains(&self, class: u32, reg: u32) -> bool {
        self.classes
            .get(class as usize)
            .is_some_and(|members| members.binary_search(&reg).is_ok())
    }
}
