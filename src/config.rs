//! Konfigurasi decode: sanity bounds dan pilihan jalur array
//!
//! Semua bound diterapkan sebelum alokasi, sehingga input yang rusak
//! atau hostile tidak bisa memicu alokasi tanpa batas.

use crate::error::{Limit, Result, WireError};

pub const DEFAULT_MAX_STRING_LEN: usize = 10 * 1024 * 1024; // 10MB
pub const DEFAULT_MAX_ARRAY_LEN: usize = 100_000;
pub const DEFAULT_MAX_TOTAL_ELEMENTS: usize = 10_000_000;
pub const DEFAULT_MAX_MESSAGE_SIZE: usize = 128 * 1024 * 1024; // 128MB

/// Sanity bounds untuk satu top-level decode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    /// Panjang maksimum satu string
    pub max_string_len: usize,
    /// Count maksimum satu array
    pub max_array_len: usize,
    /// Jumlah kumulatif element semua array dalam satu decode
    pub max_total_elements: usize,
    /// Ukuran maksimum buffer / payload message
    pub max_message_size: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_string_len: DEFAULT_MAX_STRING_LEN,
            max_array_len: DEFAULT_MAX_ARRAY_LEN,
            max_total_elements: DEFAULT_MAX_TOTAL_ELEMENTS,
            max_message_size: DEFAULT_MAX_MESSAGE_SIZE,
        }
    }
}

impl Limits {
    /// Tanpa bound, hanya untuk input yang dipercaya (misal fixture lokal)
    pub const fn unlimited() -> Self {
        Self {
            max_string_len: usize::MAX,
            max_array_len: usize::MAX,
            max_total_elements: usize::MAX,
            max_message_size: usize::MAX,
        }
    }

    pub const fn with_max_string_len(mut self, len: usize) -> Self {
        self.max_string_len = len;
        self
    }

    pub const fn with_max_array_len(mut self, len: usize) -> Self {
        self.max_array_len = len;
        self
    }

    pub const fn with_max_total_elements(mut self, total: usize) -> Self {
        self.max_total_elements = total;
        self
    }

    pub const fn with_max_message_size(mut self, size: usize) -> Self {
        self.max_message_size = size;
        self
    }

    #[inline]
    pub fn check_message_size(&self, size: usize) -> Result<()> {
        if size > self.max_message_size {
            return Err(WireError::limit(
                Limit::MessageSize,
                self.max_message_size,
                size,
            ));
        }
        Ok(())
    }
}

/// Jalur encode/decode untuk array primitif
///
/// Kedua mode menghasilkan bytes yang identik; `Bulk` hanya berlaku
/// bila layout memori host sama dengan layout wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ArrayMode {
    /// Satu memory copy untuk seluruh backing storage
    #[default]
    Bulk,
    /// Loop per element
    PerElement,
}

/// Opsi yang dibawa setiap decode call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DecodeOptions {
    pub limits: Limits,
    pub array_mode: ArrayMode,
}

impl DecodeOptions {
    pub const fn with_limits(limits: Limits) -> Self {
        Self {
            limits,
            array_mode: ArrayMode::Bulk,
        }
    }

    pub const fn array_mode(mut self, mode: ArrayMode) -> Self {
        self.array_mode = mode;
        self
    }
}
