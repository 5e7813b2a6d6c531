//! Link service behaviour against mock adapters: construction, peer
//! announcement, routing, backpressure, and query commands.

use switchlink::addr::LinkAddress;
use switchlink::config::{DEFAULT_RETRY_COUNT, LinkConfig};
use switchlink::error::Error;
use switchlink::events::LinkEvent;
use switchlink::exchange::ExchangeState;
use switchlink::frame::{self, AckPayload, Frame, Token};
use switchlink::service::LinkService;

use crate::mock_link::{MockTransport, RecordingSink};

const LAMP: &str = "AA:BB:CC:DD:EE:FF";
const FAN: &str = "11:22:33:44:55:66";

fn two_switch_config() -> LinkConfig {
    LinkConfig::from_json(
        r#"{
            "switches": [
                {
                    "device_id": "lamp",
                    "peer_address": "aa-bb-cc-dd-ee-ff",
                    "response_token": "lamp-ack",
                    "retry_count": 3,
                    "retry_interval_ms": 100
                },
                {
                    "device_id": "fan",
                    "peer_address": "11:22:33:44:55:66",
                    "response_token": "fan-ack",
                    "retry_count": 2,
                    "retry_interval_ms": 50
                }
            ]
        }"#,
    )
    .unwrap()
}

fn addr(s: &str) -> LinkAddress {
    s.parse().unwrap()
}

fn started() -> (LinkService, MockTransport, RecordingSink) {
    let (mut tr, mut sink) = (MockTransport::new(), RecordingSink::new());
    let mut service = LinkService::new(&two_switch_config()).unwrap();
    service.start(&mut tr, &mut sink).unwrap();
    (service, tr, sink)
}

fn ack(token: &str) -> Vec<u8> {
    frame::encode(&Frame::Ack {
        token: Token::try_from(token).unwrap(),
        payload: AckPayload::Status {
            on: true,
            voltage_mv: 3300,
        },
    })
    .to_vec()
}

#[test]
fn start_announces_every_peer_to_the_transport() {
    let (_, tr, sink) = started();

    assert_eq!(tr.peers.len(), 2);
    assert!(tr.peers.contains(&addr(LAMP)));
    assert!(tr.peers.contains(&addr(FAN)));

    let registered = sink
        .events
        .iter()
        .filter(|e| matches!(e, LinkEvent::PeerRegistered { .. }))
        .count();
    assert_eq!(registered, 2);
}

#[test]
fn invalid_config_never_builds_a_service() {
    let bad = LinkConfig::from_json(
        r#"{
            "switches": [{
                "device_id": "lamp",
                "peer_address": "AA:BB:CC:DD:EE:FF",
                "response_token": "lamp-ack",
                "retry_count": 0
            }]
        }"#,
    );
    assert!(matches!(bad, Err(Error::Config(_))));
}

#[test]
fn unknown_device_fails_fast_everywhere() {
    let (mut service, mut tr, mut sink) = started();

    assert_eq!(
        service.send_switch_command("ghost", true, 0, &mut tr, &mut sink),
        Err(Error::PeerNotFound)
    );
    assert_eq!(service.cancel("ghost", &mut sink), Err(Error::PeerNotFound));
    assert_eq!(service.state_of("ghost"), Err(Error::PeerNotFound));
    // Nothing was transmitted for the failed lookups.
    assert!(tr.sent.is_empty());
}

#[test]
fn busy_rejects_second_send_for_same_device() {
    let (mut service, mut tr, mut sink) = started();

    service
        .send_switch_command("lamp", true, 0, &mut tr, &mut sink)
        .unwrap();
    assert_eq!(
        service.send_switch_command("lamp", false, 5, &mut tr, &mut sink),
        Err(Error::Busy)
    );
    assert_eq!(tr.sent.len(), 1);
}

#[test]
fn independent_devices_exchange_concurrently() {
    let (mut service, mut tr, mut sink) = started();

    service
        .send_switch_command("lamp", true, 0, &mut tr, &mut sink)
        .unwrap();
    service
        .send_switch_command("fan", false, 0, &mut tr, &mut sink)
        .unwrap();
    assert_eq!(tr.sent.len(), 2);
    assert!(service.any_in_flight());

    // The fan's ack completes only the fan's exchange.
    service.on_frame_received(addr(FAN), &ack("fan-ack"), &mut sink);
    assert_eq!(service.state_of("fan").unwrap(), ExchangeState::Idle);
    assert_eq!(
        service.state_of("lamp").unwrap(),
        ExchangeState::AwaitingResponse
    );
}

#[test]
fn ack_is_matched_by_source_address_not_just_token() {
    let (mut service, mut tr, mut sink) = started();

    service
        .send_switch_command("lamp", true, 0, &mut tr, &mut sink)
        .unwrap();

    // Right token, wrong source: must not complete the exchange.
    service.on_frame_received(addr(FAN), &ack("lamp-ack"), &mut sink);
    assert_eq!(
        service.state_of("lamp").unwrap(),
        ExchangeState::AwaitingResponse
    );
}

#[test]
fn malformed_frames_are_dropped_quietly() {
    let (mut service, mut tr, mut sink) = started();

    service
        .send_switch_command("lamp", true, 0, &mut tr, &mut sink)
        .unwrap();
    let before = sink.events.len();

    service.on_frame_received(addr(LAMP), &[], &mut sink);
    service.on_frame_received(addr(LAMP), &[0xFF, 0x01, 0x02], &mut sink);
    service.on_frame_received(addr(LAMP), &[0x02, 200], &mut sink);

    assert_eq!(sink.events.len(), before);
    assert_eq!(
        service.state_of("lamp").unwrap(),
        ExchangeState::AwaitingResponse
    );
}

#[test]
fn overheard_commands_are_ignored() {
    let (mut service, _tr, mut sink) = started();

    // Another controller's command to the same peer.
    let foreign = frame::encode(&Frame::Command {
        channel: 3,
        command: switchlink::frame::SwitchCommand::On,
        token: Token::try_from("lamp-ack").unwrap(),
    });
    service.on_frame_received(addr(LAMP), &foreign, &mut sink);
    assert!(sink.outcomes().is_empty());
}

#[test]
fn status_query_yields_status_payload() {
    let (mut service, mut tr, mut sink) = started();

    service
        .send_status_query("lamp", 0, &mut tr, &mut sink)
        .unwrap();
    // Command byte on the wire is the query alphabet.
    assert_eq!(tr.sent[0].1[2], b'?');

    service.on_frame_received(addr(LAMP), &ack("lamp-ack"), &mut sink);
    assert!(matches!(
        sink.outcomes()[0],
        LinkEvent::ExchangeSucceeded {
            payload: AckPayload::Status { .. },
            ..
        }
    ));
}

#[test]
fn version_query_yields_version_payload() {
    let (mut service, mut tr, mut sink) = started();

    service
        .send_version_query("fan", 0, &mut tr, &mut sink)
        .unwrap();
    assert_eq!(tr.sent[0].1[2], b'V');

    let reply = frame::encode(&Frame::Ack {
        token: Token::try_from("fan-ack").unwrap(),
        payload: AckPayload::Version(heapless::String::try_from("2.1.0").unwrap()),
    });
    service.on_frame_received(addr(FAN), &reply, &mut sink);

    let outcomes = sink.outcomes();
    assert_eq!(outcomes.len(), 1);
    let LinkEvent::ExchangeSucceeded { payload, .. } = outcomes[0] else {
        panic!("expected success, got {:?}", outcomes[0]);
    };
    assert_eq!(
        *payload,
        AckPayload::Version(heapless::String::try_from("2.1.0").unwrap())
    );
}

#[test]
fn channel_is_embedded_in_outgoing_commands() {
    let (mut service, mut tr, mut sink) = started();

    service.set_channel(6);
    service
        .send_switch_command("lamp", true, 0, &mut tr, &mut sink)
        .unwrap();
    assert_eq!(tr.sent[0].1[1], 6);

    // Out-of-range channels fall back to 1, like the peer firmware.
    service.set_channel(15);
    assert_eq!(service.channel(), 1);
}

#[test]
fn defaults_apply_when_json_omits_retry_fields() {
    let config = LinkConfig::from_json(
        r#"{
            "switches": [{
                "device_id": "bare",
                "peer_address": "01:02:03:04:05:06",
                "response_token": "bare-ack"
            }]
        }"#,
    )
    .unwrap();
    assert_eq!(config.switches[0].retry_count, DEFAULT_RETRY_COUNT);
    let service = LinkService::new(&config).unwrap();
    assert_eq!(service.state_of("bare").unwrap(), ExchangeState::Idle);
}
