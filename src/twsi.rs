//! Raw bindings for the Marvell Galois TWSI character device.
//!
//! The driver takes two requests: a speed request and a combined
//! write-then-read request. Both carry a controller id and plain C ints; the
//! read/write request also carries raw buffer pointers with their counts.
//! Layouts and request numbers follow the vendor `i2c.h` shipped with the
//! board BSP.

use crate::error::{Result, TwsiError};
use libc::{c_int, c_ulong};
use log::debug;
use std::io;
use std::os::fd::{AsRawFd, BorrowedFd};

pub const TWSI_IOCTL_READWRITE: c_ulong = 0x1E01;
pub const TWSI_IOCTL_SETSPEED: c_ulong = 0x1E02;

pub const TWSI_STANDARD_SPEED: c_int = 0;
pub const TWSI_7BIT_SLAVE_ADDR: c_int = 0;

/// Standard-class speed code for 100 kHz compatibility mode
pub const TWSI_SPEED_100: u32 = 100;

/// The driver counts bytes in a `uint8_t`
pub const MAX_TRANSFER_LEN: usize = u8::MAX as usize;

/// Only controller 0 is wired to the FPGA
const MASTER_ID: c_int = 0;

#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct TwsiSpeedRequest {
    pub mst_id: c_int,
    pub speed_type: c_int,
    pub speed: c_int,
}

#[repr(C)]
#[derive(Debug)]
pub struct TwsiRwRequest {
    pub mst_id: c_int,
    pub slv_addr: c_int,
    pub addr_type: c_int,
    pub rd_buf: *mut u8,
    pub rd_cnt: c_int,
    pub wr_buf: *mut u8,
    pub wr_cnt: c_int,
}

impl TwsiSpeedRequest {
    pub fn standard(speed: u32) -> Self {
        TwsiSpeedRequest {
            mst_id: MASTER_ID,
            speed_type: TWSI_STANDARD_SPEED,
            speed: speed as c_int,
        }
    }
}

fn check_count(what: &'static str, len: usize) -> Result<c_int> {
    if len > MAX_TRANSFER_LEN {
        return Err(TwsiError::Length {
            what,
            len,
            max: MAX_TRANSFER_LEN,
        });
    }
    Ok(len as c_int)
}

fn buf_ptr(buf: &mut [u8]) -> *mut u8 {
    if buf.is_empty() {
        std::ptr::null_mut()
    } else {
        buf.as_mut_ptr()
    }
}

fn ioctl<T>(fd: BorrowedFd<'_>, request: c_ulong, arg: &mut T) -> io::Result<()> {
    // SAFETY: `arg` is a live #[repr(C)] request and every buffer it points
    // at outlives this call.
    let ret = unsafe { libc::ioctl(fd.as_raw_fd(), request as _, arg as *mut T) };
    if ret != 0 {
        return Err(io::Error::last_os_error());
    }
    Ok(())
}

pub fn set_speed(fd: BorrowedFd<'_>, speed: u32) -> Result<()> {
    let mut request = TwsiSpeedRequest::standard(speed);
    debug!("TWSI set speed: {:?}", request);
    ioctl(fd, TWSI_IOCTL_SETSPEED, &mut request).map_err(TwsiError::BusConfig)
}

/// One atomic transaction: `write` goes out first (may be empty), then
/// `read.len()` bytes are clocked in (may be zero).
pub fn read_write(fd: BorrowedFd<'_>, slave: u8, write: &[u8], read: &mut [u8]) -> Result<()> {
    let wr_cnt = check_count("write", write.len())?;
    let rd_cnt = check_count("read", read.len())?;

    // The driver never writes through wr_buf; a private copy keeps the
    // caller's slice immutable.
    let mut wr_copy = write.to_vec();

    let mut request = TwsiRwRequest {
        mst_id: MASTER_ID,
        slv_addr: (slave & 0x7f) as c_int,
        addr_type: TWSI_7BIT_SLAVE_ADDR,
        rd_buf: buf_ptr(read),
        rd_cnt,
        wr_buf: buf_ptr(&mut wr_copy),
        wr_cnt,
    };
    debug!(
        "TWSI transfer: slave=0x{:02x} wr_cnt={} rd_cnt={}",
        slave, wr_cnt, rd_cnt
    );

    ioctl(fd, TWSI_IOCTL_READWRITE, &mut request).map_err(|source| TwsiError::Transfer {
        op: if rd_cnt > 0 { "read" } else { "write" },
        source,
    })
}
