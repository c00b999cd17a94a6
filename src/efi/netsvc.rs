//! netsvc.rs - PXE-backed datagram transport for the dispatch loop.

use crate::buffers::NetbootBuffers;
use crate::errors::{BootError, FirmwareStatus};
use crate::logger::{log_info, log_warn};
use crate::netboot::NetbootTransport;
use crate::wire::Receiver;
use uefi::boot::{self, ScopedProtocol};
use uefi::proto::network::pxe::{BaseCode, UdpOpFlags};

/// UDP port the push sender targets.
pub const NB_PORT: u16 = 33330;

/// Enough for a full Ethernet frame's worth of payload plus header.
const MAX_DATAGRAM: usize = 1536;

pub struct PxeTransport {
    pxe: ScopedProtocol<BaseCode>,
    receiver: Receiver,
    packet: [u8; MAX_DATAGRAM],
}

fn firmware_err(op: &'static str) -> impl Fn(uefi::Error) -> BootError {
    move |err| BootError::Firmware {
        op,
        status: FirmwareStatus(err.status().0),
    }
}

impl PxeTransport {
    /// Bring the interface up: start the base code if the firmware has not
    /// already, then acquire an address over DHCP.
    pub fn open() -> Result<Self, BootError> {
        let handle =
            boot::get_handle_for_protocol::<BaseCode>().map_err(firmware_err("locate PXE"))?;
        let mut pxe = boot::open_protocol_exclusive::<BaseCode>(handle)
            .map_err(firmware_err("open PXE"))?;
        if !pxe.mode().started() {
            pxe.start(false).map_err(firmware_err("PXE start"))?;
        }
        if !pxe.mode().dhcp_ack_received() {
            pxe.dhcp(false).map_err(firmware_err("DHCP"))?;
        }
        log_info("netboot", "network interface up");
        Ok(Self {
            pxe,
            receiver: Receiver::new(),
            packet: [0; MAX_DATAGRAM],
        })
    }
}

impl NetbootTransport for PxeTransport {
    fn poll(&mut self, bufs: &mut NetbootBuffers) -> usize {
        let mut dest_port = NB_PORT;
        match self.pxe.udp_read(
            UdpOpFlags::ANY_SRC_IP | UdpOpFlags::ANY_SRC_PORT | UdpOpFlags::ANY_DEST_IP,
            None,
            Some(&mut dest_port),
            None,
            None,
            None,
            &mut self.packet,
        ) {
            Ok(len) => self.receiver.handle(&self.packet[..len], bufs),
            // Quiet wire or a transient read error; the loop just polls
            // again.
            Err(_) => 0,
        }
    }

    fn stop(&mut self) {
        if self.pxe.stop().is_err() {
            log_warn("netboot", "PXE stop failed, continuing to handoff");
        }
    }
}
