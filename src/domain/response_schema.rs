use serde_json::{Map, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaType {
    Object,
    Array,
    String,
    Number,
    Integer,
}

impl SchemaType {
    /// Type name used by the Gemini `responseSchema` dialect.
    pub fn gemini_name(self) -> &'static str {
        match self {
            Self::Object => "OBJECT",
            Self::Array => "ARRAY",
            Self::String => "STRING",
            Self::Number => "NUMBER",
            Self::Integer => "INTEGER",
        }
    }

    /// Type name used by JSON Schema.
    pub fn json_schema_name(self) -> &'static str {
        match self {
            Self::Object => "object",
            Self::Array => "array",
            Self::String => "string",
            Self::Number => "number",
            Self::Integer => "integer",
        }
    }
}

/// Declared output shape sent with a request and reused to validate the reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseSchema {
    kind: SchemaType,
    properties: Vec<(String, ResponseSchema)>,
    items: Option<Box<ResponseSchema>>,
    required: Vec<String>,
}

impl ResponseSchema {
    fn scalar(kind: SchemaType) -> Self {
        Self {
            kind,
            properties: Vec::new(),
            items: None,
            required: Vec::new(),
        }
    }

    pub fn string() -> Self {
        Self::scalar(SchemaType::String)
    }

    pub fn number() -> Self {
        Self::scalar(SchemaType::Number)
    }

    pub fn integer() -> Self {
        Self::scalar(SchemaType::Integer)
    }

    pub fn object() -> Self {
        Self::scalar(SchemaType::Object)
    }

    pub fn array(items: ResponseSchema) -> Self {
        Self {
            items: Some(Box::new(items)),
            ..Self::scalar(SchemaType::Array)
        }
    }

    pub fn property(mut self, name: impl Into<String>, schema: ResponseSchema) -> Self {
        self.properties.push((name.into(), schema));
        self
    }

    pub fn required_property(self, name: impl Into<String>, schema: ResponseSchema) -> Self {
        let name = name.into();
        let mut this = self.property(name.clone(), schema);
        this.required.push(name);
        this
    }

    pub fn kind(&self) -> SchemaType {
        self.kind
    }

    pub fn required(&self) -> &[String] {
        &self.required
    }

    pub fn items(&self) -> Option<&ResponseSchema> {
        self.items.as_deref()
    }

    pub fn property_schema(&self, name: &str) -> Option<&ResponseSchema> {
        self.properties
            .iter()
            .find(|(property, _)| property == name)
            .map(|(_, schema)| schema)
    }

    pub fn to_gemini_value(&self) -> Value {
        self.render(SchemaType::gemini_name)
    }

    pub fn to_json_schema(&self) -> Value {
        self.render(SchemaType::json_schema_name)
    }

    fn render(&self, type_name: fn(SchemaType) -> &'static str) -> Value {
        let mut node = Map::new();
        node.insert("type".to_string(), Value::from(type_name(self.kind)));

        if !self.properties.is_empty() {
            let properties = self
                .properties
                .iter()
                .map(|(name, schema)| (name.clone(), schema.render(type_name)))
                .collect::<Map<_, _>>();
            node.insert("properties".to_string(), Value::Object(properties));
        }
        if let Some(items) = &self.items {
            node.insert("items".to_string(), items.render(type_name));
        }
        if !self.required.is_empty() {
            node.insert(
                "required".to_string(),
                Value::Array(self.required.iter().cloned().map(Value::from).collect()),
            );
        }

        Value::Object(node)
    }
}
