use rand::{thread_rng, Rng};
use std::net::Ipv4Addr;
use usertcp::utils::test::frames::{arp_frame, arp_request, ethernet_frame};
use usertcp::utils::test::link::ChannelLink;
use usertcp::*;
use usertcp_packets::*;

const LOCAL_MAC: MacAddr = MacAddr {
    bytes: [0xbb, 0xbb, 0xbb, 0xbb, 0xbb, 0xbb],
};
const PEER_MAC: MacAddr = MacAddr {
    bytes: [0xaa, 0xaa, 0xaa, 0xaa, 0xaa, 0xaa],
};

fn local_ip() -> Ipv4Addr {
    Ipv4Addr::new(10, 0, 0, 1)
}

fn peer_ip() -> Ipv4Addr {
    Ipv4Addr::new(10, 0, 0, 5)
}

/// Feeds `frames` to a fresh device, runs it until the input is exhausted and
/// returns the device along with every frame it transmitted.
fn run_device(frames: Vec<Vec<u8>>, fail_sends: bool) -> (NetDevice<ChannelLink>, Vec<Vec<u8>>) {
    let (inbound, mut link, outbound) = ChannelLink::new();
    link.fail_sends(fail_sends);
    for frame in frames {
        inbound.send(frame).unwrap();
    }
    drop(inbound);

    let mut device = NetDevice::new(local_ip(), LOCAL_MAC, link);
    match device.run() {
        Err(DeviceError::LinkRead(_)) => {}
        other => panic!("device stopped with {:?}", other),
    }
    let sent = outbound.try_iter().collect();
    (device, sent)
}

#[test]
fn answers_request_for_local_address() {
    let (device, sent) = run_device(vec![arp_request(PEER_MAC, peer_ip(), local_ip())], false);

    assert_eq!(sent.len(), 1);
    let reply = EthernetFrame::from_buffer(&sent[0][..]).unwrap();
    assert_eq!(reply.len(), 42);

    let header = reply.header();
    assert_eq!(header.dest_mac(), PEER_MAC);
    assert_eq!(header.src_mac(), LOCAL_MAC);
    assert_eq!(header.ether_type(), EtherType::Arp);

    let message = ArpMessage::new_checked(reply.payload()).unwrap();
    assert_eq!(message.header().hardware_type(), ArpHardwareType::Ethernet);
    assert_eq!(message.header().protocol_type(), EtherType::Ipv4);
    assert_eq!(message.header().hardware_addr_len(), 6);
    assert_eq!(message.header().protocol_addr_len(), 4);
    assert_eq!(message.header().opcode(), ArpOp::Reply);

    let payload = message.ipv4_payload().unwrap();
    assert_eq!(payload.sender_mac(), LOCAL_MAC);
    assert_eq!(payload.sender_ip(), local_ip());
    assert_eq!(payload.target_mac(), PEER_MAC);
    assert_eq!(payload.target_ip(), peer_ip());

    assert_eq!(
        device.cache().lookup(ArpHardwareType::Ethernet, peer_ip()),
        Some(PEER_MAC)
    );
}

#[test]
fn learns_from_requests_for_other_hosts() {
    let (device, sent) = run_device(
        vec![arp_request(PEER_MAC, peer_ip(), Ipv4Addr::new(10, 0, 0, 99))],
        false,
    );

    assert!(sent.is_empty());
    assert_eq!(device.cache().len(), 1);
    assert_eq!(
        device.cache().lookup(ArpHardwareType::Ethernet, peer_ip()),
        Some(PEER_MAC)
    );
}

#[test]
fn learns_from_replies_without_answering() {
    let reply = arp_frame(ArpOp::Reply, PEER_MAC, peer_ip(), LOCAL_MAC, local_ip());
    let (device, sent) = run_device(vec![reply], false);

    assert!(sent.is_empty());
    assert_eq!(
        device.cache().lookup(ArpHardwareType::Ethernet, peer_ip()),
        Some(PEER_MAC)
    );
}

#[test]
fn rejects_unsupported_arp_without_learning() {
    let mut ieee802 = arp_request(PEER_MAC, peer_ip(), local_ip());
    ieee802[ETHERNET_HEADER_LEN + 1] = 6;

    let mut ipv6 = arp_request(PEER_MAC, peer_ip(), local_ip());
    ipv6[ETHERNET_HEADER_LEN + 2] = 0x86;
    ipv6[ETHERNET_HEADER_LEN + 3] = 0xdd;

    let mut truncated = arp_request(PEER_MAC, peer_ip(), local_ip());
    truncated.truncate(ETHERNET_HEADER_LEN + 12);

    let (device, sent) = run_device(vec![ieee802, ipv6, truncated], false);
    assert!(sent.is_empty());
    assert!(device.cache().is_empty());
}

#[test]
fn ignores_other_traffic() {
    let frames = vec![
        ethernet_frame(PEER_MAC, LOCAL_MAC, EtherType::Ipv4, &[0x45; 40]),
        ethernet_frame(PEER_MAC, LOCAL_MAC, EtherType::Ipv6, &[0x60; 40]),
        ethernet_frame(PEER_MAC, LOCAL_MAC, EtherType::Rarp, &[0; 28]),
        ethernet_frame(PEER_MAC, LOCAL_MAC, EtherType::Unknown(0x88cc), &[0; 46]),
        vec![],
        vec![0xff; 13],
    ];
    let (device, sent) = run_device(frames, false);

    assert!(sent.is_empty());
    assert!(device.cache().is_empty());
}

#[test]
fn keeps_running_after_write_failures() {
    let frames = vec![
        arp_request(PEER_MAC, peer_ip(), local_ip()),
        arp_request(
            MacAddr::new([2, 0, 0, 0, 0, 6]),
            Ipv4Addr::new(10, 0, 0, 6),
            local_ip(),
        ),
    ];
    let (device, sent) = run_device(frames, true);

    assert!(sent.is_empty());
    // The second request was still handled after the first reply was lost
    assert_eq!(device.cache().len(), 2);
}

#[test]
fn last_sender_wins() {
    let moved = MacAddr::new([2, 0, 0, 0, 0, 0x55]);
    let frames = vec![
        arp_request(PEER_MAC, peer_ip(), local_ip()),
        arp_request(moved, peer_ip(), local_ip()),
    ];
    let (device, sent) = run_device(frames, false);

    assert_eq!(sent.len(), 2);
    let second = EthernetFrame::from_buffer(&sent[1][..]).unwrap();
    assert_eq!(second.header().dest_mac(), moved);
    assert_eq!(device.cache().len(), 1);
    assert_eq!(
        device.cache().lookup(ArpHardwareType::Ethernet, peer_ip()),
        Some(moved)
    );
}

#[test]
fn random_peers() {
    let mut rng = thread_rng();
    let mut frames = Vec::new();
    let mut expected = Vec::new();
    for host in 2..=200u8 {
        let mut mac = [0u8; 6];
        rng.fill(&mut mac);
        // Locally administered unicast
        mac[0] = (mac[0] & 0xfc) | 0x02;
        let mac = MacAddr::new(mac);
        let addr = Ipv4Addr::new(10, 0, 0, host);
        let target = if rng.gen_range(0, 2) == 0 {
            local_ip()
        } else {
            Ipv4Addr::new(10, 0, 1, host)
        };
        frames.push(arp_request(mac, addr, target));
        expected.push((addr, mac, target == local_ip()));
    }

    let (device, sent) = run_device(frames, false);

    let replies: Vec<MacAddr> = sent
        .iter()
        .map(|frame| EthernetFrame::from_buffer(&frame[..]).unwrap().header().dest_mac())
        .collect();
    let answered: Vec<MacAddr> = expected
        .iter()
        .filter(|(_, _, for_us)| *for_us)
        .map(|(_, mac, _)| *mac)
        .collect();
    assert_eq!(replies, answered);

    assert_eq!(device.cache().len(), expected.len());
    for (entry, (addr, mac, _)) in device.cache().iter().zip(expected.iter()) {
        assert_eq!(entry.addr, *addr);
        assert_eq!(entry.hw_addr, *mac);
    }
}
