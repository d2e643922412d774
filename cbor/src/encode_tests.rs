use super::encode::*;
use super::*;
use alloc::{collections::BTreeMap, string::String, vec::Vec};
use hex_literal::hex;
use tessera_io::SliceWriter;

#[test]
fn rfc_tests() {
    // RFC 8949, Appendix A:
    // https://www.rfc-editor.org/rfc/rfc8949.html#section-appendix.a

    assert_eq!(emit(&0).unwrap(), hex!("00"));
    assert_eq!(emit(&1).unwrap(), hex!("01"));
    assert_eq!(emit(&10).unwrap(), hex!("0a"));
    assert_eq!(emit(&23).unwrap(), hex!("17"));
    assert_eq!(emit(&24).unwrap(), hex!("1818"));
    assert_eq!(emit(&25).unwrap(), hex!("1819"));
    assert_eq!(emit(&100).unwrap(), hex!("1864"));
    assert_eq!(emit(&1000).unwrap(), hex!("1903e8"));
    assert_eq!(emit(&1000000).unwrap(), hex!("1a000f4240"));
    assert_eq!(emit(&1000000000000u64).unwrap(), hex!("1b000000e8d4a51000"));
    assert_eq!(emit(&18446744073709551615u64).unwrap(), hex!("1bffffffffffffffff"));

    /* No bignums */

    assert_eq!(emit(&-1).unwrap(), hex!("20"));
    assert_eq!(emit(&-10).unwrap(), hex!("29"));
    assert_eq!(emit(&-100).unwrap(), hex!("3863"));
    assert_eq!(emit(&-1000).unwrap(), hex!("3903e7"));

    /* Floats keep the width of their source type */
    assert_eq!(emit(&half::f16::from_f32(0.0)).unwrap(), hex!("f90000"));
    assert_eq!(emit(&half::f16::from_f32(-0.0)).unwrap(), hex!("f98000"));
    assert_eq!(emit(&half::f16::from_f32(1.0)).unwrap(), hex!("f93c00"));
    assert_eq!(emit(&1.1).unwrap(), hex!("fb3ff199999999999a"));
    assert_eq!(emit(&half::f16::from_f32(1.5)).unwrap(), hex!("f93e00"));
    assert_eq!(emit(&half::f16::MAX).unwrap(), hex!("f97bff"));
    assert_eq!(emit(&100000.0f32).unwrap(), hex!("fa47c35000"));
    assert_eq!(emit(&f32::MAX).unwrap(), hex!("fa7f7fffff"));
    assert_eq!(emit(&1.0e+300).unwrap(), hex!("fb7e37e43c8800759c"));
    assert_eq!(
        emit(&half::f16::from_bits(0x0001)).unwrap(),
        hex!("f90001")
    );
    assert_eq!(emit(&half::f16::MIN_POSITIVE).unwrap(), hex!("f90400"));
    assert_eq!(emit(&half::f16::from_f32(-4.0)).unwrap(), hex!("f9c400"));
    assert_eq!(emit(&-4.1).unwrap(), hex!("fbc010666666666666"));
    assert_eq!(emit(&half::f16::INFINITY).unwrap(), hex!("f97c00"));
    assert_eq!(emit(&half::f16::NAN).unwrap(), hex!("f97e00"));
    assert_eq!(emit(&half::f16::NEG_INFINITY).unwrap(), hex!("f9fc00"));
    assert_eq!(emit(&f32::INFINITY).unwrap(), hex!("fa7f800000"));
    assert_eq!(emit(&f32::NAN).unwrap(), hex!("fa7fc00000"));
    assert_eq!(emit(&f32::NEG_INFINITY).unwrap(), hex!("faff800000"));
    assert_eq!(emit(&f64::INFINITY).unwrap(), hex!("fb7ff0000000000000"));
    assert_eq!(emit(&f64::NAN).unwrap(), hex!("fb7ff8000000000000"));
    assert_eq!(emit(&f64::NEG_INFINITY).unwrap(), hex!("fbfff0000000000000"));

    assert_eq!(emit(&false).unwrap(), hex!("f4"));
    assert_eq!(emit(&true).unwrap(), hex!("f5"));
    assert_eq!(emit(&Null).unwrap(), hex!("f6"));

    assert_eq!(
        emit_tagged("2013-03-21T20:04:00Z", [0]).unwrap(),
        hex!("c074323031332d30332d32315432303a30343a30305a")
    );
    assert_eq!(emit_tagged(&1363896240, [1]).unwrap(), hex!("c11a514b67b0"));
    assert_eq!(
        emit_tagged(&1363896240.5, [1]).unwrap(),
        hex!("c1fb41d452d9ec200000")
    );
    assert_eq!(
        emit_tagged(&Bytes(&hex!("01020304")), [23]).unwrap(),
        hex!("d74401020304")
    );
    assert_eq!(
        emit_tagged(&Bytes(&hex!("6449455446")), [24]).unwrap(),
        hex!("d818456449455446")
    );
    assert_eq!(
        emit_tagged("http://www.example.com", [32]).unwrap(),
        hex!("d82076687474703a2f2f7777772e6578616d706c652e636f6d")
    );

    assert_eq!(emit(&Bytes(&[])).unwrap(), hex!("40"));
    assert_eq!(emit(&Bytes(&hex!("01020304"))).unwrap(), hex!("4401020304"));
    assert_eq!(emit("").unwrap(), hex!("60"));
    assert_eq!(emit("a").unwrap(), hex!("6161"));
    assert_eq!(emit("IETF").unwrap(), hex!("6449455446"));
    assert_eq!(emit("\"\\").unwrap(), hex!("62225c"));
    assert_eq!(emit("\u{00fc}").unwrap(), hex!("62c3bc"));
    assert_eq!(emit("\u{6c34}").unwrap(), hex!("63e6b0b4"));
    assert_eq!(emit("\u{10151}").unwrap(), hex!("64f0908591"));

    assert_eq!(emit::<[u32; 0]>(&[]).unwrap(), hex!("80"));
    assert_eq!(emit(&[1, 2, 3]).unwrap(), hex!("83010203"));
    assert_eq!(
        emit(&(1, [2, 3], [4, 5])).unwrap(),
        hex!("8301820203820405")
    );
    assert_eq!(
        emit(&(1..=25).collect::<Vec<u32>>()).unwrap(),
        hex!("98190102030405060708090a0b0c0d0e0f101112131415161718181819")
    );

    assert_eq!(emit(&BTreeMap::<u8, u8>::new()).unwrap(), hex!("a0"));
    assert_eq!(
        emit(&BTreeMap::from([(3, 4), (1, 2)])).unwrap(),
        hex!("a201020304")
    );
    assert_eq!(
        emit_map(Some(2), |m| {
            m.emit("a")?;
            m.emit(&1)?;
            m.emit("b")?;
            m.emit(&[2, 3])
        })
        .unwrap(),
        hex!("a26161016162820203")
    );
    assert_eq!(
        emit_array(Some(2), |a| {
            a.emit("a")?;
            a.emit_map(Some(1), |m| {
                m.emit("b")?;
                m.emit("c")
            })
        })
        .unwrap(),
        hex!("826161a161626163")
    );
    assert_eq!(
        emit_map(Some(5), |m| {
            for (k, v) in ["a", "b", "c", "d", "e"].iter().zip(["A", "B", "C", "D", "E"]) {
                m.emit(*k)?;
                m.emit(v)?;
            }
            Ok(())
        })
        .unwrap(),
        hex!("a56161614161626142616361436164614461656145")
    );

    assert_eq!(
        emit_byte_stream(|s| {
            s.emit(&hex!("0102"))?;
            s.emit(&hex!("030405"))
        })
        .unwrap(),
        hex!("5f42010243030405ff")
    );
    assert_eq!(
        emit_text_stream(|s| {
            s.emit("strea")?;
            s.emit("ming")
        })
        .unwrap(),
        hex!("7f657374726561646d696e67ff")
    );
    assert_eq!(emit_array(None, |_| Ok(())).unwrap(), hex!("9fff"));
    assert_eq!(
        emit_array(None, |a| {
            a.emit(&1)?;
            a.emit(&[2, 3])?;
            a.emit_array(None, |a| {
                a.emit(&4)?;
                a.emit(&5)
            })
        })
        .unwrap(),
        hex!("9f018202039f0405ffff")
    );
    assert_eq!(
        emit_array(None, |a| {
            a.emit(&1)?;
            a.emit(&[2, 3])?;
            a.emit(&[4, 5])
        })
        .unwrap(),
        hex!("9f01820203820405ff")
    );
    assert_eq!(
        emit_array(Some(3), |a| {
            a.emit(&1)?;
            a.emit_array(None, |a| {
                a.emit(&2)?;
                a.emit(&3)
            })?;
            a.emit(&[4, 5])
        })
        .unwrap(),
        hex!("83019f0203ff820405")
    );
    assert_eq!(
        emit_map(None, |m| {
            m.emit("a")?;
            m.emit(&1)?;
            m.emit("b")?;
            m.emit_array(None, |a| {
                a.emit(&2)?;
                a.emit(&3)
            })
        })
        .unwrap(),
        hex!("bf61610161629f0203ffff")
    );
    assert_eq!(
        emit_map(None, |m| {
            m.emit("Fun")?;
            m.emit(&true)?;
            m.emit("Amt")?;
            m.emit(&-2)
        })
        .unwrap(),
        hex!("bf6346756ef563416d7421ff")
    );
}

#[test]
fn integer_limits() {
    assert_eq!(emit(&u8::MAX).unwrap(), hex!("18ff"));
    assert_eq!(emit(&u16::MAX).unwrap(), hex!("19ffff"));
    assert_eq!(emit(&u32::MAX).unwrap(), hex!("1affffffff"));
    assert_eq!(emit(&usize::MIN).unwrap(), hex!("00"));

    assert_eq!(emit(&i8::MAX).unwrap(), hex!("187f"));
    assert_eq!(emit(&i8::MIN).unwrap(), hex!("387f"));
    assert_eq!(emit(&i16::MIN).unwrap(), hex!("397fff"));
    assert_eq!(emit(&i32::MIN).unwrap(), hex!("3a7fffffff"));
    assert_eq!(emit(&i64::MAX).unwrap(), hex!("1b7fffffffffffffff"));
    assert_eq!(emit(&i64::MIN).unwrap(), hex!("3b7fffffffffffffff"));

    // Shortest form is chosen by magnitude, not by source width
    assert_eq!(emit(&-24i64).unwrap(), hex!("37"));
    assert_eq!(emit(&-25i64).unwrap(), hex!("3818"));
    assert_eq!(emit(&-256i64).unwrap(), hex!("38ff"));
    assert_eq!(emit(&-257i64).unwrap(), hex!("390100"));
    assert_eq!(emit(&5u64).unwrap(), hex!("05"));
}

#[test]
fn option_and_strings() {
    assert_eq!(emit(&None::<u8>).unwrap(), hex!("f6"));
    assert_eq!(emit(&Some(1u8)).unwrap(), hex!("01"));
    assert_eq!(emit(&Some("a")).unwrap(), hex!("6161"));
    assert_eq!(emit(&String::from("IETF")).unwrap(), hex!("6449455446"));
    assert_eq!(
        emit(&decode::ByteBuf(Vec::from(hex!("0102")))).unwrap(),
        hex!("420102")
    );
    assert_eq!(
        emit_tagged(&Null, [55799u32, 1]).unwrap(),
        hex!("d9d9f7c1f6")
    );
}

#[test]
fn tag_out_of_range() {
    assert_eq!(emit_tagged(&1, [-1]), Err(Error::ItemValueOutOfRange));
}

#[test]
fn sequence_length() {
    assert_eq!(
        emit_array(Some(2), |a| a.emit(&1)),
        Err(Error::SequenceLength {
            expected: 2,
            actual: 1
        })
    );
    assert_eq!(
        emit_array(Some(1), |a| {
            a.emit(&1)?;
            a.emit(&2)
        }),
        Err(Error::SequenceLength {
            expected: 1,
            actual: 2
        })
    );

    // Map counts are in entries, checked in items
    assert_eq!(
        emit_map(Some(1), |m| m.emit(&1)),
        Err(Error::SequenceLength {
            expected: 2,
            actual: 1
        })
    );
    assert_eq!(
        emit_map(None, |m| {
            m.emit(&1)?;
            m.emit(&2)?;
            m.emit(&3)
        }),
        Err(Error::SequenceLength {
            expected: 4,
            actual: 3
        })
    );

    emit_array(Some(2), |a| {
        assert!(a.is_empty());
        a.emit_null()?;
        a.emit_raw_slice(&hex!("f5"))?;
        assert_eq!(a.len(), 2);
        Ok(())
    })
    .unwrap();
}

#[test]
fn fixed_buffer() {
    let mut buf = [0u8; 8];
    let mut e = Encoder::from_writer(SliceWriter::new(&mut buf));
    e.emit("IETF").unwrap();
    e.emit(&1000).unwrap();
    assert_eq!(e.into_inner().written(), hex!("6449455446 1903e8"));

    let mut buf = [0u8; 3];
    let mut e = Encoder::from_writer(SliceWriter::new(&mut buf));
    assert_eq!(
        e.emit("IETF"),
        Err(Error::Stream(tessera_io::Error::CapacityExhausted))
    );
}

#[test]
fn offset() {
    let mut e = Encoder::new();
    assert_eq!(e.offset(), 0);
    e.emit(&[1u8, 2]).unwrap();
    assert_eq!(e.offset(), 3);
    e.emit_raw_slice(&hex!("f6")).unwrap();
    assert_eq!(e.build(), hex!("820102f6"));
}
