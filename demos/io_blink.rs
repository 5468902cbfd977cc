use pi_board_drivers::{GpioDirection, GpioLevel, HalI2c, IoPi};
use rppal::i2c::I2c;
use std::{thread, time::Duration};

// IO Pi bus 1, pin 1
const IO_ADDRESS: u8 = 0x20;
const BLINK_PIN: u8 = 1;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let i2c = I2c::new()?;
    println!("Opening IO Pi at 0x{:02X}...", IO_ADDRESS);
    let mut io = IoPi::new(HalI2c::new(i2c), IO_ADDRESS, true)?;

    io.set_pin_direction(BLINK_PIN, GpioDirection::Output)?;
    io.set_port_pullups(1, 0xFF)?;

    println!("Blinking pin {} (Press Ctrl+C to stop)", BLINK_PIN);
    loop {
        io.write_pin(BLINK_PIN, GpioLevel::High)?;
        thread::sleep(Duration::from_millis(250));
        io.write_pin(BLINK_PIN, GpioLevel::Low)?;
        thread::sleep(Duration::from_millis(250));
        println!("Port 1 inputs: 0x{:02X}", io.read_port(1)?);
    }
}
