use pi_board_drivers::{GpioDirection, GpioLevel, HalI2c, I2cSwitch, IoPi};
use rppal::i2c::I2c;
use std::cell::RefCell;

// An IO Pi behind channel 2 of an I2C Switch, both on the same bus
fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let bus = RefCell::new(HalI2c::new(I2c::new()?));

    let mut switch = I2cSwitch::new(&bus, 0x70)?;
    switch.switch_channel(2)?;
    println!("Channel 2 enabled: {}", switch.get_channel_state(2)?);

    let mut io = IoPi::new(&bus, 0x20, true)?;
    io.set_port_direction(0, 0x00)?;
    for pin in 1..=8 {
        io.write_pin(pin, GpioLevel::from(pin % 2 == 0))?;
    }
    io.set_pin_direction(9, GpioDirection::Input)?;
    println!("Pin 9: {:?}", io.read_pin(9)?);
    Ok(())
}
