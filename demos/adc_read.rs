use pi_board_drivers::{AdcPi, AdcPiConfig, BitRate, HalI2c};
use rppal::i2c::I2c;
use std::{thread, time::Duration};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let i2c = I2c::new()?;
    let config = AdcPiConfig::default().with_bit_rate(BitRate::Bits12);
    let mut adc = AdcPi::new(HalI2c::new(i2c), config)?;

    loop {
        for channel in 1..=8 {
            println!("Channel {}: {:.4} V", channel, adc.read_voltage(channel)?);
        }
        println!();
        thread::sleep(Duration::from_millis(500));
    }
}
