//! Mock transports for testing the board drivers without hardware.
#![allow(dead_code)]

use pi_board_drivers::{BusError, BusTransport, GpioLevel, OutputLines, SpiTransport};
use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::rc::Rc;

/// Records transactions performed on the mock bus
#[derive(Debug, Clone, PartialEq)]
pub enum Operation {
    Write { address: u8, data: Vec<u8> },
    Read { address: u8, len: usize },
    WriteRead { address: u8, data: Vec<u8>, len: usize },
}

impl Operation {
    pub fn is_write(&self) -> bool {
        matches!(self, Operation::Write { .. })
    }
}

/// Shared state for the mock bus (uses interior mutability)
#[derive(Debug, Default)]
struct MockState {
    /// Simulated register file (device address, register) -> value
    registers: HashMap<(u8, u8), u8>,
    /// Register pointer per device, set by the first byte of a write
    pointers: HashMap<u8, u8>,
    /// Last single-byte command per device (register-less chips)
    commands: HashMap<u8, u8>,
    /// Queued responses for plain reads, consumed in order
    queued_reads: HashMap<u8, VecDeque<Vec<u8>>>,
    /// Response for plain reads once the queue is empty
    sticky_reads: HashMap<u8, Vec<u8>>,
    operations: Vec<Operation>,
    fail_next_write: Option<BusError>,
    fail_next_read: Option<BusError>,
}

impl MockState {
    fn fill_from_registers(&mut self, address: u8, start: u8, buffer: &mut [u8]) {
        for (i, byte) in buffer.iter_mut().enumerate() {
            let reg = start.wrapping_add(i as u8);
            *byte = self.registers.get(&(address, reg)).copied().unwrap_or(0);
        }
    }
}

/// Recording I2C transport. Clones share the same state, so a test can
/// hand one clone to a driver and inspect the bus through another.
#[derive(Debug, Clone, Default)]
pub struct MockBus {
    state: Rc<RefCell<MockState>>,
}

impl MockBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_register(&self, address: u8, register: u8, value: u8) {
        self.state
            .borrow_mut()
            .registers
            .insert((address, register), value);
    }

    pub fn register(&self, address: u8, register: u8) -> u8 {
        self.state
            .borrow()
            .registers
            .get(&(address, register))
            .copied()
            .unwrap_or(0)
    }

    pub fn command(&self, address: u8) -> Option<u8> {
        self.state.borrow().commands.get(&address).copied()
    }

    pub fn queue_read(&self, address: u8, data: &[u8]) {
        self.state
            .borrow_mut()
            .queued_reads
            .entry(address)
            .or_default()
            .push_back(data.to_vec());
    }

    pub fn set_sticky_read(&self, address: u8, data: &[u8]) {
        self.state
            .borrow_mut()
            .sticky_reads
            .insert(address, data.to_vec());
    }

    pub fn fail_next_write(&self, error: BusError) {
        self.state.borrow_mut().fail_next_write = Some(error);
    }

    pub fn fail_next_read(&self, error: BusError) {
        self.state.borrow_mut().fail_next_read = Some(error);
    }

    pub fn operations(&self) -> Vec<Operation> {
        self.state.borrow().operations.clone()
    }

    pub fn operation_count(&self) -> usize {
        self.state.borrow().operations.len()
    }

    pub fn writes(&self) -> Vec<Vec<u8>> {
        self.state
            .borrow()
            .operations
            .iter()
            .filter_map(|op| match op {
                Operation::Write { data, .. } => Some(data.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn clear_operations(&self) {
        self.state.borrow_mut().operations.clear();
    }
}

impl BusTransport for MockBus {
    fn write(&mut self, address: u8, data: &[u8]) -> Result<(), BusError> {
        let mut state = self.state.borrow_mut();
        state.operations.push(Operation::Write {
            address,
            data: data.to_vec(),
        });
        if let Some(err) = state.fail_next_write.take() {
            return Err(err);
        }
        if let Some((&first, rest)) = data.split_first() {
            state.pointers.insert(address, first);
            if rest.is_empty() {
                state.commands.insert(address, first);
            }
            for (i, &value) in rest.iter().enumerate() {
                state
                    .registers
                    .insert((address, first.wrapping_add(i as u8)), value);
            }
        }
        Ok(())
    }

    fn read(&mut self, address: u8, buffer: &mut [u8]) -> Result<(), BusError> {
        let mut state = self.state.borrow_mut();
        state.operations.push(Operation::Read {
            address,
            len: buffer.len(),
        });
        if let Some(err) = state.fail_next_read.take() {
            return Err(err);
        }
        let queued = state
            .queued_reads
            .get_mut(&address)
            .and_then(|q| q.pop_front());
        let response = queued.or_else(|| state.sticky_reads.get(&address).cloned());
        if let Some(data) = response {
            let len = data.len().min(buffer.len());
            buffer[..len].copy_from_slice(&data[..len]);
        } else if let Some(&command) = state.commands.get(&address) {
            buffer.fill(0);
            if let Some(first) = buffer.first_mut() {
                *first = command;
            }
        } else {
            let start = state.pointers.get(&address).copied().unwrap_or(0);
            state.fill_from_registers(address, start, buffer);
        }
        Ok(())
    }

    fn write_read(&mut self, address: u8, data: &[u8], buffer: &mut [u8]) -> Result<(), BusError> {
        let mut state = self.state.borrow_mut();
        state.operations.push(Operation::WriteRead {
            address,
            data: data.to_vec(),
            len: buffer.len(),
        });
        if let Some(err) = state.fail_next_read.take() {
            return Err(err);
        }
        let start = data.first().copied().unwrap_or(0);
        state.pointers.insert(address, start);
        state.fill_from_registers(address, start, buffer);
        Ok(())
    }
}

#[derive(Debug, Default)]
struct SpiState {
    sent: Vec<Vec<u8>>,
    responses: VecDeque<Vec<u8>>,
    fail_next: Option<BusError>,
}

/// Recording SPI transport; clones share state.
#[derive(Debug, Clone, Default)]
pub struct MockSpi {
    state: Rc<RefCell<SpiState>>,
}

impl MockSpi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues the bytes clocked in by the next transfer.
    pub fn queue_response(&self, data: &[u8]) {
        self.state.borrow_mut().responses.push_back(data.to_vec());
    }

    pub fn fail_next(&self, error: BusError) {
        self.state.borrow_mut().fail_next = Some(error);
    }

    pub fn sent(&self) -> Vec<Vec<u8>> {
        self.state.borrow().sent.clone()
    }

    pub fn transfer_count(&self) -> usize {
        self.state.borrow().sent.len()
    }
}

impl SpiTransport for MockSpi {
    fn transfer(&mut self, buffer: &mut [u8]) -> Result<(), BusError> {
        let mut state = self.state.borrow_mut();
        state.sent.push(buffer.to_vec());
        if let Some(err) = state.fail_next.take() {
            return Err(err);
        }
        let response = state.responses.pop_front().unwrap_or_default();
        buffer.fill(0);
        let len = response.len().min(buffer.len());
        buffer[..len].copy_from_slice(&response[..len]);
        Ok(())
    }
}

/// Records every level driven on every line.
#[derive(Debug, Clone, Default)]
pub struct MockLines {
    log: Rc<RefCell<Vec<(u8, GpioLevel)>>>,
}

impl MockLines {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn log(&self) -> Vec<(u8, GpioLevel)> {
        self.log.borrow().clone()
    }
}

impl OutputLines for MockLines {
    fn set_line(&mut self, id: u8, level: GpioLevel) -> pi_board_drivers::Result<()> {
        self.log.borrow_mut().push((id, level));
        Ok(())
    }
}
