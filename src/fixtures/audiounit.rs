//! Plugin registry fixtures: payload realistis untuk benchmark
//!
//! Struktur tiga level (registry → plugin → parameter) dengan banyak
//! string pendek. Nilainya sample data, tanpa semantik domain.

use std::sync::Arc;

use super::{
    cached_schema, read_struct_array, struct_array_size, structs_value, write_struct_array,
    WireStruct,
};
use crate::config::ArrayMode;
use crate::core::{DecodeCursor, WireWriter};
use crate::error::Result;
use crate::protocol::{
    read_utf8, string_size, write_string, FieldKind, OwnedValue, Primitive, Schema, Value,
};

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Parameter {
    pub address: u64,
    pub display_name: String,
    pub identifier: String,
    pub unit: String,
    pub min_value: f32,
    pub max_value: f32,
    pub default_value: f32,
    pub current_value: f32,
    pub raw_flags: u32,
    pub is_writable: bool,
    pub can_ramp: bool,
}

// min/max/default/current f32 + raw_flags u32 + 2 bool
const PARAMETER_TAIL: usize = 4 * 4 + 4 + 2;

impl WireStruct for Parameter {
    const NAME: &'static str = "Parameter";

    fn schema() -> Arc<Schema> {
        cached_schema!(Schema::new(Self::NAME)
            .field("address", FieldKind::U64)
            .field("display_name", FieldKind::String)
            .field("identifier", FieldKind::String)
            .field("unit", FieldKind::String)
            .field("min_value", FieldKind::F32)
            .field("max_value", FieldKind::F32)
            .field("default_value", FieldKind::F32)
            .field("current_value", FieldKind::F32)
            .field("raw_flags", FieldKind::U32)
            .field("is_writable", FieldKind::BOOL)
            .field("can_ramp", FieldKind::BOOL)
            .build())
    }

    fn encoded_size(&self) -> usize {
        8 + string_size(self.display_name.len())
            + string_size(self.identifier.len())
            + string_size(self.unit.len())
            + PARAMETER_TAIL
    }

    fn encode_flat(&self, w: &mut WireWriter<'_>, _mode: ArrayMode) -> Result<()> {
        w.put(self.address)?;
        write_string(w, self.display_name.as_bytes())?;
        write_string(w, self.identifier.as_bytes())?;
        write_string(w, self.unit.as_bytes())?;
        let out = w.reserve(PARAMETER_TAIL)?;
        self.min_value.write_le(&mut out[0..4]);
        self.max_value.write_le(&mut out[4..8]);
        self.default_value.write_le(&mut out[8..12]);
        self.current_value.write_le(&mut out[12..16]);
        self.raw_flags.write_le(&mut out[16..20]);
        self.is_writable.write_le(&mut out[20..21]);
        self.can_ramp.write_le(&mut out[21..22]);
        Ok(())
    }

    fn decode_flat(c: &mut DecodeCursor<'_>, _mode: ArrayMode) -> Result<Self> {
        let address = c.read()?;
        let display_name = read_utf8(c)?;
        let identifier = read_utf8(c)?;
        let unit = read_utf8(c)?;
        let raw = c.take(PARAMETER_TAIL)?;
        Ok(Self {
            address,
            display_name,
            identifier,
            unit,
            min_value: f32::read_le(&raw[0..4]),
            max_value: f32::read_le(&raw[4..8]),
            default_value: f32::read_le(&raw[8..12]),
            current_value: f32::read_le(&raw[12..16]),
            raw_flags: u32::read_le(&raw[16..20]),
            is_writable: bool::read_le(&raw[20..21]),
            can_ramp: bool::read_le(&raw[21..22]),
        })
    }

    fn to_value(&self) -> OwnedValue {
        Value::Struct(vec![
            Value::U64(self.address),
            OwnedValue::str(&self.display_name),
            OwnedValue::str(&self.identifier),
            OwnedValue::str(&self.unit),
            Value::F32(self.min_value),
            Value::F32(self.max_value),
            Value::F32(self.default_value),
            Value::F32(self.current_value),
            Value::U32(self.raw_flags),
            Value::Bool(self.is_writable),
            Value::Bool(self.can_ramp),
        ])
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Plugin {
    pub name: String,
    pub manufacturer_id: String,
    pub component_type: String,
    pub component_subtype: String,
    pub parameters: Vec<Parameter>,
}

impl WireStruct for Plugin {
    const NAME: &'static str = "Plugin";

    fn schema() -> Arc<Schema> {
        cached_schema!(Schema::new(Self::NAME)
            .field("name", FieldKind::String)
            .field("manufacturer_id", FieldKind::String)
            .field("component_type", FieldKind::String)
            .field("component_subtype", FieldKind::String)
            .field("parameters", FieldKind::array(FieldKind::of(&Parameter::schema())))
            .build())
    }

    fn encoded_size(&self) -> usize {
        string_size(self.name.len())
            + string_size(self.manufacturer_id.len())
            + string_size(self.component_type.len())
            + string_size(self.component_subtype.len())
            + struct_array_size(&self.parameters)
    }

    fn encode_flat(&self, w: &mut WireWriter<'_>, mode: ArrayMode) -> Result<()> {
        write_string(w, self.name.as_bytes())?;
        write_string(w, self.manufacturer_id.as_bytes())?;
        write_string(w, self.component_type.as_bytes())?;
        write_string(w, self.component_subtype.as_bytes())?;
        write_struct_array(w, &self.parameters, mode)
    }

    fn decode_flat(c: &mut DecodeCursor<'_>, mode: ArrayMode) -> Result<Self> {
        Ok(Self {
            name: read_utf8(c)?,
            manufacturer_id: read_utf8(c)?,
            component_type: read_utf8(c)?,
            component_subtype: read_utf8(c)?,
            parameters: read_struct_array(c, mode)?,
        })
    }

    fn to_value(&self) -> OwnedValue {
        Value::Struct(vec![
            OwnedValue::str(&self.name),
            OwnedValue::str(&self.manufacturer_id),
            OwnedValue::str(&self.component_type),
            OwnedValue::str(&self.component_subtype),
            structs_value(&self.parameters),
        ])
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct PluginRegistry {
    pub plugins: Vec<Plugin>,
    pub total_plugin_count: u32,
    pub total_parameter_count: u32,
}

impl PluginRegistry {
    /// Registry sintetis yang deterministik: `plugins` × `params_per_plugin`
    pub fn sample(plugins: usize, params_per_plugin: usize) -> Self {
        let plugins: Vec<Plugin> = (0..plugins)
            .map(|p| Plugin {
                name: format!("Plugin {p}"),
                manufacturer_id: format!("M{:03}", p % 17),
                component_type: "aufx".to_string(),
                component_subtype: format!("s{p:03}"),
                parameters: (0..params_per_plugin)
                    .map(|i| Parameter {
                        address: (p * 1000 + i) as u64,
                        display_name: format!("Param {i}"),
                        identifier: format!("plugin{p}.param{i}"),
                        unit: if i % 2 == 0 { "dB" } else { "Hz" }.to_string(),
                        min_value: 0.0,
                        max_value: 1.0 + i as f32,
                        default_value: 0.5,
                        current_value: i as f32 * 0.25,
                        raw_flags: 0xC000_0000 | i as u32,
                        is_writable: i % 3 != 0,
                        can_ramp: i % 2 == 1,
                    })
                    .collect(),
            })
            .collect();
        Self {
            total_plugin_count: plugins.len() as u32,
            total_parameter_count: plugins.iter().map(|p| p.parameters.len() as u32).sum(),
            plugins,
        }
    }
}

impl WireStruct for PluginRegistry {
    const NAME: &'static str = "PluginRegistry";

    fn schema() -> Arc<Schema> {
        cached_schema!(Schema::new(Self::NAME)
            .field("plugins", FieldKind::array(FieldKind::of(&Plugin::schema())))
            .field("total_plugin_count", FieldKind::U32)
            .field("total_parameter_count", FieldKind::U32)
            .build())
    }

    fn encoded_size(&self) -> usize {
        struct_array_size(&self.plugins) + 8
    }

    fn encode_flat(&self, w: &mut WireWriter<'_>, mode: ArrayMode) -> Result<()> {
        write_struct_array(w, &self.plugins, mode)?;
        w.put(self.total_plugin_count)?;
        w.put(self.total_parameter_count)
    }

    fn decode_flat(c: &mut DecodeCursor<'_>, mode: ArrayMode) -> Result<Self> {
        Ok(Self {
            plugins: read_struct_array(c, mode)?,
            total_plugin_count: c.read()?,
            total_parameter_count: c.read()?,
        })
    }

    fn to_value(&self) -> OwnedValue {
        Value::Struct(vec![
            structs_value(&self.plugins),
            Value::U32(self.total_plugin_count),
            Value::U32(self.total_parameter_count),
        ])
    }
}
