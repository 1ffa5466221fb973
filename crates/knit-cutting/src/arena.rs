use knit_core::errors::{ErrorInfo, KnitError};

fn arena_error(code: &str, message: &str, index: usize) -> KnitError {
    KnitError::Cutting(ErrorInfo::new(code, message).with_context("index", index))
}

/// Fixed-length output buffer filled by index in any order.
#[derive(Debug, Clone)]
pub(crate) struct SlotArena<T> {
    slots: Vec<Option<T>>,
}

impl<T> SlotArena<T> {
    pub(crate) fn with_len(len: usize) -> Self {
        Self {
            slots: std::iter::repeat_with(|| None).take(len).collect(),
        }
    }

    pub(crate) fn place(&mut self, index: usize, value: T) -> Result<(), KnitError> {
        let slot = self
            .slots
            .get_mut(index)
            .ok_or_else(|| arena_error("arena-slot-out-of-range", "no such output slot", index))?;
        if slot.is_some() {
            return Err(arena_error(
                "arena-slot-occupied",
                "output slot written twice",
                index,
            ));
        }
        *slot = Some(value);
        Ok(())
    }

    pub(crate) fn into_vec(self) -> Result<Vec<T>, KnitError> {
        self.slots
            .into_iter()
            .enumerate()
            .map(|(index, slot)| {
                slot.ok_or_else(|| arena_error("arena-slot-empty", "output slot never written", index))
            })
            .collect()
    }
}
