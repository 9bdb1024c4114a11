//! Byte-exact compatibility with the reference protobuf encoding, pinned
//! with known wire vectors.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use prowire::codec::{ProtoDecode, ProtoEncode, Sint64};
use prowire::message::{Message, MessageDescriptor};
use prowire::{field, impl_message};

fn hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

fn unhex(s: &str) -> Vec<u8> {
    assert!(s.len() % 2 == 0);
    (0..s.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(&s[i..i + 2], 16).unwrap())
        .collect()
}

#[derive(Debug, Default, Clone, PartialEq)]
struct Recursive {
    double_val: f64,
    recursive: Option<Box<Recursive>>,
}

impl Message for Recursive {
    fn descriptor() -> &'static MessageDescriptor<Self> {
        static DESC: LazyLock<MessageDescriptor<Recursive>> = LazyLock::new(|| {
            MessageDescriptor::new("Recursive")
                .field(
                    1,
                    "double_val",
                    |m: &Recursive| &m.double_val,
                    |m: &mut Recursive| &mut m.double_val,
                )
                .field(
                    24,
                    "recursive",
                    |m: &Recursive| &m.recursive,
                    |m: &mut Recursive| &mut m.recursive,
                )
        });
        &DESC
    }
}
impl_message!(Recursive);

#[derive(Debug, Default, Clone, PartialEq)]
struct Signed {
    value: Sint64,
}

impl Message for Signed {
    fn descriptor() -> &'static MessageDescriptor<Self> {
        static DESC: LazyLock<MessageDescriptor<Signed>> = LazyLock::new(|| {
            MessageDescriptor::new("Signed").field(
                1,
                "value",
                |m: &Signed| &m.value,
                |m: &mut Signed| &mut m.value,
            )
        });
        &DESC
    }
}
impl_message!(Signed);

#[derive(Debug, Default, Clone, PartialEq)]
struct Translations {
    words: BTreeMap<String, String>,
}

impl Message for Translations {
    fn descriptor() -> &'static MessageDescriptor<Self> {
        static DESC: LazyLock<MessageDescriptor<Translations>> = LazyLock::new(|| {
            MessageDescriptor::new("Translations").map(
                1,
                "words",
                |m: &Translations| &m.words,
                |m: &mut Translations| &mut m.words,
            )
        });
        &DESC
    }
}
impl_message!(Translations);

#[derive(Debug, Default, Clone, PartialEq)]
struct Packed {
    values: Vec<u32>,
}

impl Message for Packed {
    fn descriptor() -> &'static MessageDescriptor<Self> {
        static DESC: LazyLock<MessageDescriptor<Packed>> = LazyLock::new(|| {
            MessageDescriptor::new("Packed").repeated(
                4,
                "values",
                |m: &Packed| &m.values,
                |m: &mut Packed| &mut m.values,
            )
        });
        &DESC
    }
}
impl_message!(Packed);

#[test]
fn nested_recursive_vector() {
    let msg = Recursive {
        double_val: 1.0,
        recursive: Some(Box::new(Recursive {
            double_val: 2.0,
            recursive: None,
        })),
    };
    let expected = "09000000000000f03fc20109090000000000000040";
    assert_eq!(hex(&msg.encode_to_vec()), expected);
    assert_eq!(Recursive::decode(&unhex(expected)).unwrap(), msg);
}

#[test]
fn sint64_vector() {
    let value = Sint64(12_345_678_901);
    let mut payload = Vec::new();
    value.encode(&mut payload);
    assert_eq!(hex(&payload), "eaf0e0fd5b");
    assert_eq!(payload.len(), value.encoded_len());

    let mut decoded = Sint64(0);
    decoded.merge_from(&mut &payload[..]).unwrap();
    assert_eq!(decoded, value);

    let msg = Signed { value };
    assert_eq!(hex(&msg.encode_to_vec()), "08eaf0e0fd5b");
    assert_eq!(Signed::decode(&unhex("08eaf0e0fd5b")).unwrap(), msg);
}

#[test]
fn string_map_vector() {
    let msg = Translations {
        words: BTreeMap::from([
            ("one".to_string(), "uno".to_string()),
            ("two".to_string(), "dos".to_string()),
        ]),
    };
    let one_entry = "0a0a0a036f6e651203756e6f";
    let two_entry = "0a0a0a0374776f1203646f73";

    // BTreeMap iterates keys in order, so the encoding is deterministic.
    let expected = format!("{one_entry}{two_entry}");
    assert_eq!(hex(&msg.encode_to_vec()), expected);

    // Entry order on the wire is insignificant.
    assert_eq!(Translations::decode(&unhex(&expected)).unwrap(), msg);
    let reversed = format!("{two_entry}{one_entry}");
    assert_eq!(Translations::decode(&unhex(&reversed)).unwrap(), msg);
}

#[test]
fn packed_repeated_vector() {
    let msg = Packed {
        values: vec![3, 270, 86942],
    };
    let expected = "2206038e029ea705";
    assert_eq!(hex(&msg.encode_to_vec()), expected);
    assert_eq!(Packed::decode(&unhex(expected)).unwrap(), msg);

    // The same values written as individual varint records decode equally.
    let mut unpacked = Vec::new();
    for value in [3u32, 270, 86942] {
        field::write_field(4, &value, true, &mut unpacked);
    }
    assert_eq!(Packed::decode(&unpacked).unwrap(), msg);
}

#[test]
fn zero_length_message_vector() {
    assert_eq!(hex(&Recursive::default().encode_to_vec()), "");
    assert_eq!(Recursive::decode(&[]).unwrap(), Recursive::default());
}
