use codec::{
    decode_packet, encode_packet, BlockData, BlockEntry, CodecError, FieldValue, Packet,
    UnfragmentableReason,
};
use glam::Vec3;
use schema::{FieldType, LengthPrefix, MapBlock, MapField, MapPacket, Protocol};
use uuid::Uuid;
use wire::{split_datagram, stamp_sequence, Frequency, Limits, MTU};

/// Low-frequency header (10) + 30-byte single block = 40-byte fixed prefix,
/// then one variable block of 12-byte occurrences.
fn positions_layout() -> MapPacket {
    MapPacket::new("ObjectPositions", Frequency::Low, 400)
        .reliable(true)
        .block(
            MapBlock::single("AgentData")
                .field(MapField::new("AgentID", FieldType::Uuid))
                .field(MapField::new("Origin", FieldType::Vector3))
                .field(MapField::new("Flags", FieldType::U16)),
        )
        .block(MapBlock::variable("Positions").field(MapField::new("Pos", FieldType::Vector3)))
}

fn positions(count: usize) -> Packet {
    let entries = (0..count)
        .map(|i| {
            let i = i as f32;
            BlockEntry::new(vec![FieldValue::Vector3(Vec3::new(i, i * 2.0, i * 3.0))])
        })
        .collect();
    Packet::new(vec![
        BlockData::single(vec![
            FieldValue::Uuid(Uuid::from_u128(42)),
            FieldValue::Vector3(Vec3::new(128.0, 128.0, 20.0)),
            FieldValue::U16(3),
        ]),
        BlockData::new(entries),
    ])
}

fn decode_all(protocol: &Protocol, buffers: &[Vec<u8>]) -> Vec<Packet> {
    buffers
        .iter()
        .map(|buf| {
            let datagram = split_datagram(buf).unwrap();
            decode_packet(protocol, &datagram.header, datagram.body).unwrap()
        })
        .collect()
}

#[test]
fn packet_within_mtu_is_one_buffer() {
    let schema = positions_layout();
    // 40 + 1 + 96 * 12 = 1193 bytes.
    let packet = positions(96);
    let buffers = encode_packet(&schema, &schema.header(1), &packet, &Limits::default()).unwrap();
    assert_eq!(buffers.len(), 1);
    assert_eq!(buffers[0].len(), 1193);
}

#[test]
fn packet_exactly_at_mtu_is_one_buffer() {
    let schema = MapPacket::new("Blob", Frequency::Low, 401)
        .block(MapBlock::single("Data").field(MapField::fixed("Bytes", MTU - 10)));
    let packet = Packet::new(vec![BlockData::single(vec![FieldValue::Fixed(vec![
        1;
        MTU - 10
    ])])]);
    let buffers = encode_packet(&schema, &schema.header(1), &packet, &Limits::default()).unwrap();
    assert_eq!(buffers.len(), 1);
    assert_eq!(buffers[0].len(), MTU);
}

#[test]
fn fragments_reproduce_every_occurrence_in_order() {
    let schema = positions_layout();
    let protocol = Protocol::new(vec![schema.clone()]).unwrap();
    let packet = positions(200);

    let buffers = encode_packet(&schema, &schema.header(7), &packet, &Limits::default()).unwrap();
    // 1159 bytes of room per fragment hold 96 occurrences.
    assert_eq!(buffers.len(), 3);
    assert!(buffers.iter().all(|buf| buf.len() <= MTU));

    let fragments = decode_all(&protocol, &buffers);
    let counts: Vec<_> = fragments.iter().map(|f| f.blocks[1].len()).collect();
    assert_eq!(counts, vec![96, 96, 8]);

    let mut joined = Vec::new();
    for fragment in &fragments {
        assert_eq!(fragment.blocks[0], packet.blocks[0]);
        joined.extend(fragment.blocks[1].entries.iter().cloned());
    }
    assert_eq!(joined, packet.blocks[1].entries);
}

#[test]
fn extend_from_fragment_reassembles_packet() {
    let schema = positions_layout();
    let protocol = Protocol::new(vec![schema.clone()]).unwrap();
    let packet = positions(200);

    let buffers = encode_packet(&schema, &schema.header(7), &packet, &Limits::default()).unwrap();
    let mut fragments = decode_all(&protocol, &buffers).into_iter();
    let mut whole = fragments.next().unwrap();
    for fragment in fragments {
        whole.extend_from_fragment(&schema, fragment).unwrap();
    }
    assert_eq!(whole, packet);
}

#[test]
fn fragments_share_header_until_stamped() {
    let schema = positions_layout();
    let packet = positions(200);
    let mut buffers =
        encode_packet(&schema, &schema.header(7), &packet, &Limits::default()).unwrap();

    for buf in &buffers {
        let header = split_datagram(buf).unwrap().header;
        assert_eq!(header.sequence, 7);
        assert!(header.flags.is_reliable());
        assert_eq!((header.frequency, header.id), (Frequency::Low, 400));
    }

    for (sequence, buf) in (7..).zip(buffers.iter_mut()) {
        stamp_sequence(buf, sequence).unwrap();
    }
    let sequences: Vec<_> = buffers
        .iter()
        .map(|buf| split_datagram(buf).unwrap().header.sequence)
        .collect();
    assert_eq!(sequences, vec![7, 8, 9]);
}

#[test]
fn trailing_fixed_block_is_unfragmentable() {
    let schema = MapPacket::new("Broken", Frequency::Low, 402)
        .block(MapBlock::variable("Items").field(MapField::fixed("Data", 100)))
        .block(MapBlock::single("Footer").field(MapField::new("Value", FieldType::U32)));
    assert!(schema.cannot_multiple());

    let items = (0..20)
        .map(|_| BlockEntry::new(vec![FieldValue::Fixed(vec![0; 100])]))
        .collect();
    let packet = Packet::new(vec![
        BlockData::new(items),
        BlockData::single(vec![FieldValue::U32(1)]),
    ]);

    let result = encode_packet(&schema, &schema.header(1), &packet, &Limits::default());
    assert!(matches!(
        result,
        Err(CodecError::Unfragmentable {
            reason: UnfragmentableReason::TrailingFixedBlock,
            ..
        })
    ));
}

#[test]
fn trailing_fixed_block_is_fine_within_mtu() {
    let schema = MapPacket::new("Broken", Frequency::Low, 402)
        .block(MapBlock::variable("Items").field(MapField::fixed("Data", 100)))
        .block(MapBlock::single("Footer").field(MapField::new("Value", FieldType::U32)));
    let packet = Packet::new(vec![
        BlockData::new(vec![BlockEntry::new(vec![FieldValue::Fixed(vec![0; 100])])]),
        BlockData::single(vec![FieldValue::U32(1)]),
    ]);
    let buffers = encode_packet(&schema, &schema.header(1), &packet, &Limits::default()).unwrap();
    assert_eq!(buffers.len(), 1);
}

#[test]
fn oversized_fixed_prefix_is_unfragmentable() {
    let schema = MapPacket::new("Huge", Frequency::Low, 403)
        .block(MapBlock::single("Data").field(MapField::fixed("Bytes", 1195)))
        .block(MapBlock::variable("Items").field(MapField::new("ID", FieldType::U32)));
    let packet = Packet::new(vec![
        BlockData::single(vec![FieldValue::Fixed(vec![0; 1195])]),
        BlockData::default(),
    ]);
    let err = encode_packet(&schema, &schema.header(1), &packet, &Limits::default()).unwrap_err();
    assert_eq!(
        err,
        CodecError::Unfragmentable {
            packet: "Huge".into(),
            len: 1206,
            reason: UnfragmentableReason::FixedPrefixExceedsMtu {
                prefix: 1206,
                mtu: MTU,
            },
        }
    );
}

#[test]
fn occurrence_larger_than_fragment_room_is_rejected() {
    let schema = MapPacket::new("Notes", Frequency::Low, 404)
        .block(MapBlock::single("AgentData").field(MapField::new("AgentID", FieldType::Uuid)))
        .block(
            MapBlock::variable("Notes")
                .field(MapField::variable("Text", LengthPrefix::U16)),
        );
    let note = |len| BlockEntry::new(vec![FieldValue::Variable(vec![b'x'; len])]);
    let packet = Packet::new(vec![
        BlockData::single(vec![FieldValue::Uuid(Uuid::nil())]),
        BlockData::new(vec![note(10), note(1000), note(1024)]),
    ]);

    // At MTU 1000 a fragment has 1000 - (10 + 16 + 1) = 973 bytes of room.
    let limits = Limits::with_mtu(1000);
    let err = encode_packet(&schema, &schema.header(1), &packet, &limits).unwrap_err();
    assert_eq!(
        err,
        CodecError::OccurrenceTooLarge {
            packet: "Notes".into(),
            block: "Notes".into(),
            index: 1,
            len: 1002,
            capacity: 973,
        }
    );

    let buffers = encode_packet(&schema, &schema.header(1), &packet, &Limits::default()).unwrap();
    assert_eq!(buffers.len(), 2);
}

#[test]
fn overflow_detected_before_any_buffer() {
    let schema = MapPacket::new("Names", Frequency::Low, 405).block(
        MapBlock::variable("Names")
            .field(MapField::variable("Name", LengthPrefix::U8)),
    );
    let mut entries: Vec<_> = (0..20)
        .map(|_| BlockEntry::new(vec![FieldValue::Variable(vec![b'a'; 200])]))
        .collect();
    entries[19] = BlockEntry::new(vec![FieldValue::Variable(vec![b'a'; 300])]);
    let packet = Packet::new(vec![BlockData::new(entries)]);

    let err = encode_packet(&schema, &schema.header(1), &packet, &Limits::default()).unwrap_err();
    assert!(matches!(err, CodecError::Overflow { len: 300, max: 255, .. }));
}

#[test]
fn earlier_variable_block_starves_later_one() {
    let schema = MapPacket::new("TwoLists", Frequency::Low, 406)
        .block(MapBlock::variable("Large").field(MapField::fixed("Data", 96)))
        .block(MapBlock::variable("Small").field(MapField::new("ID", FieldType::U32)));
    let protocol = Protocol::new(vec![schema.clone()]).unwrap();

    let large = (0..6u8)
        .map(|i| BlockEntry::new(vec![FieldValue::Fixed(vec![i; 96])]))
        .collect();
    let small = (0..10)
        .map(|i| BlockEntry::new(vec![FieldValue::U32(i)]))
        .collect();
    let packet = Packet::new(vec![BlockData::new(large), BlockData::new(small)]);

    // 10-byte header + 2 count bytes leaves 288: three large entries fill it.
    let buffers = encode_packet(&schema, &schema.header(1), &packet, &Limits::with_mtu(300)).unwrap();
    let fragments = decode_all(&protocol, &buffers);
    let counts: Vec<_> = fragments
        .iter()
        .map(|f| (f.blocks[0].len(), f.blocks[1].len()))
        .collect();
    assert_eq!(counts, vec![(3, 0), (3, 0), (0, 10)]);

    let mut whole = fragments[0].clone();
    for fragment in fragments.into_iter().skip(1) {
        whole.extend_from_fragment(&schema, fragment).unwrap();
    }
    assert_eq!(whole, packet);
}

#[test]
fn empty_variable_blocks_still_fit_one_buffer() {
    let schema = positions_layout();
    let packet = positions(0);
    let buffers = encode_packet(&schema, &schema.header(1), &packet, &Limits::default()).unwrap();
    assert_eq!(buffers.len(), 1);
    assert_eq!(buffers[0].len(), 41);
    assert_eq!(*buffers[0].last().unwrap(), 0);
}
