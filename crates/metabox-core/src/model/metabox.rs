use crate::{context::ObjectType, model::FieldModel, model::ModelError};
use serde::Serialize;
use std::collections::BTreeSet;

///
/// BoxModel
///
/// One logical form: a named, ordered set of field descriptors bound to an
/// object type. Insertion order is render/save order.
///

#[derive(Clone, Debug, Serialize)]
pub struct BoxModel {
    id: String,
    object_type: ObjectType,
    fields: Vec<FieldModel>,
}

impl BoxModel {
    pub fn new(id: impl Into<String>, object_type: ObjectType) -> Result<Self, ModelError> {
        let id = id.into();
        if id.is_empty() {
            return Err(ModelError::EmptyBoxId);
        }

        Ok(Self {
            id,
            object_type,
            fields: Vec::new(),
        })
    }

    /// Append a field, enforcing id uniqueness within the box.
    pub fn with_field(mut self, field: FieldModel) -> Result<Self, ModelError> {
        if self.fields.iter().any(|f| f.id() == field.id()) {
            return Err(ModelError::DuplicateFieldId(field.id().to_owned()));
        }

        self.fields.push(field);
        Ok(self)
    }

    pub fn with_fields(mut self, fields: Vec<FieldModel>) -> Result<Self, ModelError> {
        let mut seen: BTreeSet<&str> = self.fields.iter().map(FieldModel::id).collect();
        for field in &fields {
            if !seen.insert(field.id()) {
                return Err(ModelError::DuplicateFieldId(field.id().to_owned()));
            }
        }

        self.fields.extend(fields);
        Ok(self)
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    #[must_use]
    pub const fn object_type(&self) -> ObjectType {
        self.object_type
    }

    #[must_use]
    pub fn fields(&self) -> &[FieldModel] {
        &self.fields
    }

    #[must_use]
    pub fn field(&self, id: &str) -> Option<&FieldModel> {
        self.fields.iter().find(|f| f.id() == id)
    }
}

///
/// TESTS
///
