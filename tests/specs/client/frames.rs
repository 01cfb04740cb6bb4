// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Wire-format specs for multiplexed channel frames.

#![allow(clippy::unwrap_used)]

use caravel_client::{Channel, ChannelFrame, ExecMessage, TerminalSize};

#[test]
fn channel_table_is_fixed() {
    let table = [
        (0u8, "stdin"),
        (1, "stdout"),
        (2, "stderr"),
        (3, "error"),
        (4, "resize"),
    ];
    for (byte, name) in table {
        let channel = Channel::try_from(byte).unwrap();
        assert_eq!(channel.index(), byte);
        assert_eq!(channel.name(), name);
    }
    assert!(Channel::try_from(5).is_err());
}

#[test]
fn outbound_frames_carry_only_channel_byte_and_payload() {
    let stdin = ChannelFrame::new(Channel::Stdin, b"exit\n".to_vec());
    assert_eq!(stdin.encode(), b"\x00exit\n");

    let resize = TerminalSize::new(100, 40).to_frame().unwrap();
    let encoded = resize.encode();
    assert_eq!(encoded[0], 4);
    assert_eq!(&encoded[1..], br#"{"Width":100,"Height":40}"#);
}

#[test]
fn inbound_frames_demultiplex_by_leading_byte() {
    let sequence: Vec<Vec<u8>> = vec![
        b"\x01stdout here".to_vec(),
        b"\x02stderr here".to_vec(),
        b"\x01more stdout".to_vec(),
        b"\x03{\"status\":\"Success\"}".to_vec(),
    ];

    let channels: Vec<Channel> = sequence
        .iter()
        .map(|raw| ChannelFrame::decode(raw).unwrap().channel)
        .collect();

    assert_eq!(
        channels,
        vec![Channel::Stdout, Channel::Stderr, Channel::Stdout, Channel::Error]
    );
}

#[test]
fn exec_messages_are_named_by_channel() {
    let frame = ChannelFrame::decode(b"\x02oh no").unwrap();
    let message = ExecMessage::from_frame(&frame);
    assert_eq!(message.channel.name(), "stderr");
    assert_eq!(message.output, "oh no");
}
