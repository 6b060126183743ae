//! Modify/delete restrictions from downstream LR lifecycle

use serde::{Deserialize, Serialize};

use crate::types::*;

/// Lifecycle signals owned by manifest, invoice and POD bookkeeping
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LifecycleFlags {
    /// Loaded on a trip manifest
    pub manifested: bool,
    /// Billed on a client invoice
    pub invoiced: bool,
    /// Proof of delivery received
    pub pod_received: bool,
    pub cancelled: bool,
}

impl LifecycleFlags {
    /// Reason the LR can no longer be modified, if any
    pub fn modify_block(&self) -> Option<&'static str> {
        if self.cancelled {
            Some("LR is cancelled")
        } else if self.invoiced {
            Some("LR is already invoiced")
        } else if self.pod_received {
            Some("POD has been received")
        } else {
            None
        }
    }

    /// Reason the LR can no longer be deleted, if any
    pub fn delete_block(&self) -> Option<&'static str> {
        if self.invoiced {
            Some("LR is already invoiced")
        } else if self.pod_received {
            Some("POD has been received")
        } else if self.manifested {
            Some("LR is on a manifest")
        } else {
            None
        }
    }

    pub fn can_modify(&self) -> bool {
        self.modify_block().is_none()
    }

    pub fn can_delete(&self) -> bool {
        self.delete_block().is_none()
    }

    pub fn ensure_modifiable(&self, lr_number: &str) -> FreightResult<()> {
        match self.modify_block() {
            Some(reason) => Err(FreightError::LrLocked {
                lr_number: lr_number.to_string(),
                reason: reason.to_string(),
            }),
            None => Ok(()),
        }
    }

    pub fn ensure_deletable(&self, lr_number: &str) -> FreightResult<()> {
        match self.delete_block() {
            Some(reason) => Err(FreightError::LrLocked {
                lr_number: lr_number.to_string(),
                reason: reason.to_string(),
            }),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_lr_is_open() {
        let flags = LifecycleFlags::default();
        assert!(flags.can_modify());
        assert!(flags.can_delete());
    }

    #[test]
    fn test_manifested_lr_can_be_modified_not_deleted() {
        let flags = LifecycleFlags {
            manifested: true,
            ..LifecycleFlags::default()
        };
        assert!(flags.ensure_modifiable("LR-1001").is_ok());
        let err = flags.ensure_deletable("LR-1001").unwrap_err();
        assert_eq!(err.to_string(), "LR LR-1001 is locked: LR is on a manifest");
    }

    #[test]
    fn test_invoiced_or_delivered_lr_is_locked() {
        let invoiced = LifecycleFlags {
            invoiced: true,
            ..LifecycleFlags::default()
        };
        assert!(!invoiced.can_modify());
        assert!(!invoiced.can_delete());

        let delivered = LifecycleFlags {
            pod_received: true,
            ..LifecycleFlags::default()
        };
        assert!(matches!(
            delivered.ensure_modifiable("LR-7"),
            Err(FreightError::LrLocked { .. })
        ));
    }

    #[test]
    fn test_cancelled_lr_can_still_be_deleted() {
        let cancelled = LifecycleFlags {
            cancelled: true,
            ..LifecycleFlags::default()
        };
        assert!(!cancelled.can_modify());
        assert!(cancelled.can_delete());
    }
}
