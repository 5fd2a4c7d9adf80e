//! Codec Tests
//!
//! Tests for request and response framing and the tagged value encoding.

use std::io::Cursor;

use rankkv::protocol::{
    decode_request, decode_response, decode_value, encode_request, encode_response, encode_value,
    read_request, read_response, write_request, write_response, ErrorCode, Limits, Request, Value,
    MAX_NESTING,
};

fn limits() -> Limits {
    Limits::default()
}

// =============================================================================
// Request Encoding/Decoding Tests
// =============================================================================

#[test]
fn test_request_layout_is_little_endian() {
    let request = Request::from_parts(["get", "k"]);
    let encoded = encode_request(&request);

    let expected: Vec<u8> = vec![
        16, 0, 0, 0, // body length
        2, 0, 0, 0, // nargs
        3, 0, 0, 0, b'g', b'e', b't', // "get"
        1, 0, 0, 0, b'k', // "k"
    ];
    assert_eq!(encoded, expected);
}

#[test]
fn test_encode_decode_request() {
    let request = Request::from_parts(["zquery", "zset", "1", "", "0", "10"]);
    let encoded = encode_request(&request);
    let decoded = decode_request(&encoded, &limits()).unwrap();

    assert_eq!(decoded, request);
    assert!(decoded.args[3].is_empty());
}

#[test]
fn test_request_with_binary_arguments() {
    // Arguments may contain length-prefix lookalikes and null bytes
    let binary: Vec<u8> = (0..=255).collect();
    let request = Request::new(vec![b"set".to_vec(), vec![0, 0, 0, 0], binary.clone()]);

    let decoded = decode_request(&encode_request(&request), &limits()).unwrap();
    assert_eq!(decoded.args[1], vec![0, 0, 0, 0]);
    assert_eq!(decoded.args[2], binary);
}

#[test]
fn test_request_trailing_bytes_rejected() {
    let mut encoded = encode_request(&Request::from_parts(["keys"]));
    // grow the declared body by one byte and append garbage
    encoded[0] += 1;
    encoded.push(0xAA);

    let err = decode_request(&encoded, &limits()).unwrap_err();
    assert!(err.to_string().contains("Trailing bytes"));
}

#[test]
fn test_request_truncated_argument() {
    let encoded = encode_request(&Request::from_parts(["get", "key"]));
    let mut truncated = encoded[..encoded.len() - 1].to_vec();
    truncated[0] -= 1; // keep the frame self-consistent

    let err = decode_request(&truncated, &limits()).unwrap_err();
    assert!(err.to_string().contains("Incomplete argument"));
}

#[test]
fn test_request_too_many_args() {
    let limits = Limits {
        max_message_size: 1024,
        max_args: 2,
    };
    let encoded = encode_request(&Request::from_parts(["a", "b", "c"]));
    let err = decode_request(&encoded, &limits).unwrap_err();
    assert!(err.to_string().contains("Too many arguments"));
}

#[test]
fn test_request_too_large() {
    let limits = Limits {
        max_message_size: 16,
        max_args: 100,
    };
    let encoded = encode_request(&Request::from_parts(["set", "key", "a long value"]));
    let err = decode_request(&encoded, &limits).unwrap_err();
    assert!(err.to_string().contains("too large"));
}

#[test]
fn test_incomplete_header() {
    let bytes = [0x01, 0x00, 0x00];
    let err = decode_request(&bytes, &limits()).unwrap_err();
    assert!(err.to_string().contains("Incomplete request header"));
}

// =============================================================================
// Value Encoding/Decoding Tests
// =============================================================================

#[test]
fn test_value_tags_and_sizes() {
    let cases: Vec<(Value, Vec<u8>)> = vec![
        (Value::Nil, vec![0]),
        (Value::Int(1), vec![3, 1, 0, 0, 0, 0, 0, 0, 0]),
        (Value::Dbl(2.0), {
            let mut v = vec![4];
            v.extend_from_slice(&2.0f64.to_le_bytes());
            v
        }),
        (Value::str("ab"), vec![2, 2, 0, 0, 0, b'a', b'b']),
        (
            Value::error(ErrorCode::BadArgument, "x"),
            vec![1, 4, 0, 0, 0, 1, 0, 0, 0, b'x'],
        ),
        (Value::Arr(vec![]), vec![5, 0, 0, 0, 0]),
    ];

    for (value, expected) in cases {
        let mut buf = Vec::new();
        encode_value(&mut buf, &value);
        assert_eq!(buf, expected, "encoding of {:?}", value);

        let (decoded, used) = decode_value(&buf).unwrap();
        assert_eq!(decoded, value);
        assert_eq!(used, buf.len());
    }
}

#[test]
fn test_decode_value_reports_own_length() {
    // A value followed by unrelated bytes: the decoder must stop at its end
    let value = Value::Arr(vec![
        Value::str("n1"),
        Value::Dbl(1.1),
        Value::Arr(vec![Value::Nil, Value::Int(-7)]),
    ]);
    let mut buf = Vec::new();
    encode_value(&mut buf, &value);
    let len = buf.len();
    buf.extend_from_slice(&[0xDE, 0xAD]);

    let (decoded, used) = decode_value(&buf).unwrap();
    assert_eq!(decoded, value);
    assert_eq!(used, len);
}

#[test]
fn test_decode_unknown_tag() {
    let err = decode_value(&[0x09]).unwrap_err();
    assert!(err.to_string().contains("Unknown value tag"));
}

#[test]
fn test_decode_truncated_values() {
    assert!(decode_value(&[]).is_err());
    assert!(decode_value(&[3, 1, 2]).is_err()); // int needs 8 bytes
    assert!(decode_value(&[2, 5, 0, 0, 0, b'a']).is_err()); // str shorter than len
    assert!(decode_value(&[5, 2, 0, 0, 0, 0]).is_err()); // array missing an element
}

#[test]
fn test_decode_rejects_deep_nesting() {
    let mut buf = Vec::new();
    for _ in 0..=MAX_NESTING + 1 {
        buf.extend_from_slice(&[5, 1, 0, 0, 0]);
    }
    buf.push(0);

    let err = decode_value(&buf).unwrap_err();
    assert!(err.to_string().contains("nested"));
}

// =============================================================================
// Response Encoding/Decoding Tests
// =============================================================================

#[test]
fn test_encode_decode_response() {
    let value = Value::Arr(vec![Value::str("n2"), Value::Dbl(2.0)]);
    let encoded = encode_response(&value, 1024);

    assert_eq!(
        u32::from_le_bytes([encoded[0], encoded[1], encoded[2], encoded[3]]) as usize,
        encoded.len() - 4
    );
    assert_eq!(decode_response(&encoded, &limits()).unwrap(), value);
}

#[test]
fn test_oversized_response_becomes_error() {
    let value = Value::str(vec![b'z'; 100]);
    let encoded = encode_response(&value, 64);

    match decode_response(&encoded, &limits()).unwrap() {
        Value::Err { code, message } => {
            assert_eq!(code, ErrorCode::TooBig);
            assert_eq!(message, "response too big");
        }
        other => panic!("Expected TooBig error, got {:?}", other),
    }
}

#[test]
fn test_response_trailing_bytes_rejected() {
    let mut encoded = encode_response(&Value::Nil, 1024);
    encoded[0] += 1;
    encoded.push(0);

    let err = decode_response(&encoded, &limits()).unwrap_err();
    assert!(err.to_string().contains("Trailing bytes"));
}

// =============================================================================
// Stream I/O Tests
// =============================================================================

#[test]
fn test_stream_request_round_trip() {
    let mut buf = Vec::new();
    let first = Request::from_parts(["set", "k", "v"]);
    let second = Request::from_parts(["get", "k"]);
    write_request(&mut buf, &first).unwrap();
    write_request(&mut buf, &second).unwrap();

    let mut cursor = Cursor::new(buf);
    assert_eq!(read_request(&mut cursor, &limits()).unwrap(), first);
    assert_eq!(read_request(&mut cursor, &limits()).unwrap(), second);
    assert!(read_request(&mut cursor, &limits()).is_err()); // EOF
}

#[test]
fn test_stream_response_round_trip() {
    let mut buf = Vec::new();
    write_response(&mut buf, &Value::Int(1), &limits()).unwrap();
    write_response(&mut buf, &Value::Nil, &limits()).unwrap();

    let mut cursor = Cursor::new(buf);
    assert_eq!(read_response(&mut cursor, &limits()).unwrap(), Value::Int(1));
    assert_eq!(read_response(&mut cursor, &limits()).unwrap(), Value::Nil);
}

#[test]
fn test_stream_rejects_oversized_header_before_reading_body() {
    let limits = Limits {
        max_message_size: 8,
        max_args: 10,
    };
    // Only the header is present; the size check must fire first
    let mut cursor = Cursor::new(1000u32.to_le_bytes().to_vec());
    let err = read_request(&mut cursor, &limits).unwrap_err();
    assert!(err.to_string().contains("too large"));
}
