//! Tiny ONNX graphs for tests
//!
//! Hand-encodes the few protobuf messages a single-node graph needs
//! (ModelProto, GraphProto, NodeProto, ValueInfoProto), so the ONNX paths
//! can be tested without shipping binary models.

use std::path::{Path, PathBuf};

const ELEM_FLOAT: u64 = 1;
const ELEM_INT64: u64 = 7;
const ATTR_INT: u64 = 2;
const IR_VERSION: u64 = 8;
const OPSET: u64 = 13;

/// Protobuf message under construction
#[derive(Default)]
struct Message(Vec<u8>);

impl Message {
    fn varint(mut self, field: u64, value: u64) -> Self {
        self.put_varint(field << 3);
        self.put_varint(value);
        self
    }

    fn bytes(mut self, field: u64, data: &[u8]) -> Self {
        self.put_varint((field << 3) | 2);
        self.put_varint(data.len() as u64);
        self.0.extend_from_slice(data);
        self
    }

    fn string(self, field: u64, value: &str) -> Self {
        self.bytes(field, value.as_bytes())
    }

    fn message(self, field: u64, inner: Message) -> Self {
        self.bytes(field, &inner.0)
    }

    fn put_varint(&mut self, mut value: u64) {
        loop {
            let byte = (value & 0x7f) as u8;
            value >>= 7;
            if value == 0 {
                self.0.push(byte);
                return;
            }
            self.0.push(byte | 0x80);
        }
    }
}

/// ValueInfoProto for a tensor with fixed dims
fn tensor_info(name: &str, elem_type: u64, dims: &[u64]) -> Message {
    let shape = dims
        .iter()
        .fold(Message::default(), |shape, &dim| shape.message(1, Message::default().varint(1, dim)));
    let tensor = Message::default().varint(1, elem_type).message(2, shape);

    Message::default()
        .string(1, name)
        .message(2, Message::default().message(1, tensor))
}

/// One node reading `inputs`, writing "y"; graph input "x"
fn single_node(op: &str, inputs: &[&str], attrs: &[(&str, i64)], input: Message, output: Message) -> Vec<u8> {
    let mut node = Message::default();
    for name in inputs {
        node = node.string(1, name);
    }
    node = node.string(2, "y").string(3, "node0").string(4, op);
    for (name, value) in attrs {
        let attr = Message::default()
            .string(1, name)
            .varint(3, *value as u64)
            .varint(20, ATTR_INT);
        node = node.message(5, attr);
    }

    let graph = Message::default()
        .message(1, node)
        .string(2, "fixture")
        .message(11, input)
        .message(12, output);

    let opset = Message::default().string(1, "").varint(2, OPSET);

    Message::default()
        .varint(1, IR_VERSION)
        .string(2, "flowguard-tests")
        .message(7, graph)
        .message(8, opset)
        .0
}

/// `y = x`, f32 `[1, n]` in and out
pub fn identity(n: u64) -> Vec<u8> {
    single_node(
        "Identity",
        &["x"],
        &[],
        tensor_info("x", ELEM_FLOAT, &[1, n]),
        tensor_info("y", ELEM_FLOAT, &[1, n]),
    )
}

/// `y = x - x`: reconstructs every row as zeros
pub fn zeros(n: u64) -> Vec<u8> {
    single_node(
        "Sub",
        &["x", "x"],
        &[],
        tensor_info("x", ELEM_FLOAT, &[1, n]),
        tensor_info("y", ELEM_FLOAT, &[1, n]),
    )
}

/// int64 label output `[1]`: index of the largest input value
pub fn argmax_label(n: u64) -> Vec<u8> {
    single_node(
        "ArgMax",
        &["x"],
        &[("axis", 1), ("keepdims", 0)],
        tensor_info("x", ELEM_FLOAT, &[1, n]),
        tensor_info("y", ELEM_INT64, &[1]),
    )
}

pub fn write(dir: &Path, file_name: &str, model: &[u8]) -> PathBuf {
    let path = dir.join(file_name);
    std::fs::write(&path, model).unwrap();
    path
}
