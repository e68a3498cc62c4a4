//! Schema: definisi tipe bernama berupa daftar field berurutan
//!
//! Urutan field adalah bagian dari wire contract. Struct reference
//! di-resolve langsung via `Arc<Schema>`, sehingga nested struct
//! di-decode inline tanpa lookup registry.

use std::fmt;
use std::sync::Arc;

use super::primitive::PrimitiveKind;
use super::value::{ArrayValue, Backing, Value};
use crate::error::{Limit, Result, WireError};

/// Kind sebuah field
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldKind {
    Primitive(PrimitiveKind),
    String,
    Struct(Arc<Schema>),
    Array(Box<FieldKind>),
    Optional(Box<FieldKind>),
}

impl FieldKind {
    pub const U8: FieldKind = FieldKind::Primitive(PrimitiveKind::U8);
    pub const U16: FieldKind = FieldKind::Primitive(PrimitiveKind::U16);
    pub const U32: FieldKind = FieldKind::Primitive(PrimitiveKind::U32);
    pub const U64: FieldKind = FieldKind::Primitive(PrimitiveKind::U64);
    pub const I8: FieldKind = FieldKind::Primitive(PrimitiveKind::I8);
    pub const I16: FieldKind = FieldKind::Primitive(PrimitiveKind::I16);
    pub const I32: FieldKind = FieldKind::Primitive(PrimitiveKind::I32);
    pub const I64: FieldKind = FieldKind::Primitive(PrimitiveKind::I64);
    pub const F32: FieldKind = FieldKind::Primitive(PrimitiveKind::F32);
    pub const F64: FieldKind = FieldKind::Primitive(PrimitiveKind::F64);
    pub const BOOL: FieldKind = FieldKind::Primitive(PrimitiveKind::Bool);

    pub fn array(element: FieldKind) -> Self {
        FieldKind::Array(Box::new(element))
    }

    pub fn optional(inner: FieldKind) -> Self {
        FieldKind::Optional(Box::new(inner))
    }

    pub fn of(schema: &Arc<Schema>) -> Self {
        FieldKind::Struct(Arc::clone(schema))
    }

    /// Lebar encoded jika fixed-width (primitif, atau struct yang seluruhnya fixed)
    pub fn fixed_size(&self) -> Option<usize> {
        match self {
            FieldKind::Primitive(kind) => Some(kind.width()),
            FieldKind::Struct(schema) => schema.fixed_size(),
            FieldKind::String | FieldKind::Array(_) | FieldKind::Optional(_) => None,
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldKind::Primitive(kind) => write!(f, "{kind}"),
            FieldKind::String => f.write_str("str"),
            FieldKind::Struct(schema) => f.write_str(schema.name()),
            FieldKind::Array(element) => write!(f, "[]{element}"),
            FieldKind::Optional(inner) => write!(f, "?{inner}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub name: String,
    pub kind: FieldKind,
}

/// Tipe bernama: daftar field dalam urutan deklarasi
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    name: String,
    fields: Vec<Field>,
}

impl Schema {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
        }
    }

    /// Tambah field di akhir (builder)
    pub fn field(mut self, name: impl Into<String>, kind: FieldKind) -> Self {
        self.fields.push(Field {
            name: name.into(),
            kind,
        });
        self
    }

    pub fn build(self) -> Arc<Schema> {
        Arc::new(self)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn field_index(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }

    /// Ukuran encoded bila semua field fixed-width
    pub fn fixed_size(&self) -> Option<usize> {
        self.fields.iter().map(|f| f.kind.fixed_size()).sum()
    }

    /// Validasi bentuk value terhadap schema
    ///
    /// Gagal dengan `SchemaMismatch` berisi path field (misal `Scene.main_rect.color`).
    pub fn check<B: Backing>(&self, value: &Value<B>) -> Result<()> {
        check_struct(self, value, self.name())
    }
}

fn mismatch(path: &str, expected: &dyn fmt::Display) -> WireError {
    WireError::SchemaMismatch {
        path: path.to_string(),
        expected: expected.to_string(),
    }
}

fn check_struct<B: Backing>(schema: &Schema, value: &Value<B>, path: &str) -> Result<()> {
    let fields = match value {
        Value::Struct(fields) if fields.len() == schema.fields.len() => fields,
        _ => {
            let expected = format!("struct {} with {} fields", schema.name, schema.fields.len());
            return Err(mismatch(path, &expected));
        }
    };
    for (field, value) in schema.fields.iter().zip(fields.iter()) {
        check_kind(&field.kind, value, &format!("{path}.{}", field.name))?;
    }
    Ok(())
}

fn check_kind<B: Backing>(kind: &FieldKind, value: &Value<B>, path: &str) -> Result<()> {
    match (kind, value) {
        (FieldKind::Primitive(expected), value) if value.primitive_kind() == Some(*expected) => {
            Ok(())
        }
        (FieldKind::String, Value::Str(_)) => Ok(()),
        (FieldKind::Struct(schema), value) => check_struct(schema, value, path),
        (FieldKind::Array(element), Value::Array(array)) => match (element.as_ref(), array) {
            (FieldKind::Primitive(expected), ArrayValue::Primitive(packed))
                if packed.kind() == *expected =>
            {
                Ok(())
            }
            (_, ArrayValue::Elements(items)) => items
                .iter()
                .enumerate()
                .try_for_each(|(i, item)| check_kind(element, item, &format!("{path}[{i}]"))),
            _ => Err(mismatch(path, kind)),
        },
        (FieldKind::Optional(inner), Value::Optional(slot)) => match slot {
            Some(value) => check_kind(inner, &**value, path),
            None => Ok(()),
        },
        _ => Err(mismatch(path, kind)),
    }
}

/// Registry schema untuk message envelope
///
/// Type id diberikan berurutan mulai dari 1 sesuai urutan registrasi.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    schemas: Vec<Arc<Schema>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registrasi schema, return type id yang diberikan
    ///
    /// Type id 0 tidak pernah dipakai, jadi registry penuh setelah
    /// `u16::MAX` schema.
    pub fn register(&mut self, schema: Arc<Schema>) -> Result<u16> {
        let next = self.schemas.len() + 1;
        let type_id = u16::try_from(next)
            .map_err(|_| WireError::limit(Limit::TypeIds, usize::from(u16::MAX), next))?;
        self.schemas.push(schema);
        Ok(type_id)
    }

    pub fn get(&self, type_id: u16) -> Option<&Arc<Schema>> {
        let index = usize::from(type_id).checked_sub(1)?;
        self.schemas.get(index)
    }

    pub fn type_id_of(&self, name: &str) -> Option<u16> {
        self.iter()
            .find(|(_, schema)| schema.name() == name)
            .map(|(type_id, _)| type_id)
    }

    pub fn by_name(&self, name: &str) -> Result<(u16, &Arc<Schema>)> {
        let type_id = self
            .type_id_of(name)
            .ok_or_else(|| WireError::UnknownSchema {
                name: name.to_string(),
            })?;
        Ok((type_id, &self.schemas[usize::from(type_id) - 1]))
    }

    /// Iterasi `(type_id, schema)`
    pub fn iter(&self) -> impl Iterator<Item = (u16, &Arc<Schema>)> {
        (1..=u16::MAX).zip(&self.schemas)
    }

    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }
}
