//! Dynamic gRPC codec over runtime message descriptors.
//!
//! # Responsibilities
//! - Decode request frames into `DynamicMessage` using the method's input
//!   descriptor
//! - Encode `DynamicMessage` responses with prost
//! - Convert between messages and the JSON view resolution works on
//!
//! # Design Decisions
//! - The JSON view uses proto field names as written and includes
//!   default-valued fields, so request patterns match what operators wrote
//!   in the schema
//! - Responses deserialize leniently (unknown fields ignored): structural
//!   validation of configured responses is out of scope

use prost::Message;
use prost_reflect::{DeserializeOptions, DynamicMessage, MessageDescriptor, MethodDescriptor, SerializeOptions};
use serde_json::Value;
use tonic::codec::{Codec, DecodeBuf, Decoder, EncodeBuf, Encoder};
use tonic::Status;

/// A `tonic::codec::Codec` built per call from a method descriptor.
#[derive(Debug, Clone)]
pub struct DynamicCodec {
    decode: MessageDescriptor,
}

impl DynamicCodec {
    /// Server-side codec: decodes the method's input type.
    pub fn server(method: &MethodDescriptor) -> Self {
        Self {
            decode: method.input(),
        }
    }

    /// Client-side codec: decodes the method's output type.
    pub fn client(method: &MethodDescriptor) -> Self {
        Self {
            decode: method.output(),
        }
    }
}

impl Codec for DynamicCodec {
    type Encode = DynamicMessage;
    type Decode = DynamicMessage;
    type Encoder = DynamicEncoder;
    type Decoder = DynamicDecoder;

    fn encoder(&mut self) -> Self::Encoder {
        DynamicEncoder
    }

    fn decoder(&mut self) -> Self::Decoder {
        DynamicDecoder {
            descriptor: self.decode.clone(),
        }
    }
}

/// Encodes messages with prost; the message carries its own descriptor.
pub struct DynamicEncoder;

impl Encoder for DynamicEncoder {
    type Item = DynamicMessage;
    type Error = Status;

    fn encode(&mut self, item: Self::Item, dst: &mut EncodeBuf<'_>) -> Result<(), Self::Error> {
        item.encode(dst)
            .map_err(|e| Status::internal(format!("Failed to encode message: {e}")))
    }
}

/// Decodes frames against a fixed message descriptor.
pub struct DynamicDecoder {
    descriptor: MessageDescriptor,
}

impl Decoder for DynamicDecoder {
    type Item = DynamicMessage;
    type Error = Status;

    fn decode(&mut self, src: &mut DecodeBuf<'_>) -> Result<Option<Self::Item>, Self::Error> {
        let message = DynamicMessage::decode(self.descriptor.clone(), src)
            .map_err(|e| Status::invalid_argument(format!("Failed to decode message: {e}")))?;
        Ok(Some(message))
    }
}

/// Render a request message as the JSON value pattern matching runs on.
pub fn message_to_json(message: &DynamicMessage) -> Result<Value, serde_json::Error> {
    let options = SerializeOptions::new()
        .use_proto_field_name(true)
        .skip_default_fields(false);
    message.serialize_with_options(serde_json::value::Serializer, &options)
}

/// Build a response message from a configured JSON payload.
pub fn json_to_message(
    descriptor: MessageDescriptor,
    payload: Value,
) -> Result<DynamicMessage, serde_json::Error> {
    let options = DeserializeOptions::new().deny_unknown_fields(false);
    DynamicMessage::deserialize_with_options(descriptor, payload, &options)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schemas::SchemaRegistry;
    use serde_json::json;
    use std::fs;

    const GREETER: &str = r#"
        syntax = "proto3";
        package pkg;
        service Greeter {
            rpc SayHello (HelloRequest) returns (HelloReply);
        }
        message HelloRequest { string name = 1; int32 age = 2; }
        message HelloReply { string message = 1; }
    "#;

    fn greeter_method() -> MethodDescriptor {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("greeter.proto"), GREETER).unwrap();
        let registry = SchemaRegistry::new(dir.path());
        registry.load().unwrap();
        let index = registry.snapshot();
        let method = index
            .get("pkg.Greeter")
            .unwrap()
            .methods()
            .find(|m| m.name() == "SayHello")
            .unwrap();
        method
    }

    #[test]
    fn request_json_keeps_proto_names_and_defaults() {
        let method = greeter_method();
        let message = json_to_message(method.input(), json!({"name": "Alice"})).unwrap();
        let value = message_to_json(&message).unwrap();
        // Proto field names as written, defaults included.
        assert_eq!(value, json!({"name": "Alice", "age": 0}));
    }

    #[test]
    fn unknown_response_fields_are_ignored() {
        let method = greeter_method();
        let message =
            json_to_message(method.output(), json!({"message": "hi", "extra": true})).unwrap();
        let value = message_to_json(&message).unwrap();
        assert_eq!(value, json!({"message": "hi"}));
    }

    #[test]
    fn mistyped_response_is_rejected() {
        let method = greeter_method();
        assert!(json_to_message(method.output(), json!({"message": [1, 2]})).is_err());
    }
}
