use pi_board_drivers::{HalI2c, HalLines, ServoPi, ServoPiConfig};
use rppal::{gpio::Gpio, i2c::I2c};
use std::{thread, time::Duration};

// Servo Pi output enable is wired to BCM 4
const OE_PIN: u8 = 4;
const SERVO_CHANNEL: u8 = 1;
const STEPS: u32 = 250;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let i2c = I2c::new()?;
    let oe = Gpio::new()?.get(OE_PIN)?.into_output();
    let config = ServoPiConfig::default().with_limits(1.0, 2.0).with_oe_line(0);
    let mut servo = ServoPi::with_lines(HalI2c::new(i2c), HalLines::new(vec![oe]), config)?;
    servo.output_enable()?;

    println!("Sweeping servo on channel {} (Press Ctrl+C to stop)", SERVO_CHANNEL);
    loop {
        for position in [0, STEPS / 2, STEPS] {
            servo.move_servo(SERVO_CHANNEL, position, STEPS)?;
            println!(
                "Position {} (read back {})",
                position,
                servo.get_servo_position(SERVO_CHANNEL, STEPS)?
            );
            thread::sleep(Duration::from_millis(800));
        }
    }
}
