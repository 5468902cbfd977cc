use pi_board_drivers::{HalI2c, RtcPi, SquareWave};
use rppal::i2c::I2c;
use std::{env, thread, time::Duration};
use time::{Date, Month, PrimitiveDateTime, Time};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let i2c = I2c::new()?;
    let mut rtc = RtcPi::new(HalI2c::new(i2c), 0x68)?;

    // Pass "set" to reset the clock to a fixed date
    if env::args().any(|a| a == "set") {
        let date = Date::from_calendar_date(2025, Month::January, 1)?;
        rtc.set_date(PrimitiveDateTime::new(date, Time::from_hms(12, 0, 0)?))?;
    }
    rtc.set_frequency(SquareWave::Hz1)?;
    rtc.enable_output()?;

    loop {
        println!("{}", rtc.read_date()?);
        thread::sleep(Duration::from_secs(1));
    }
}
