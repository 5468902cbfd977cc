//! Internal constants, register addresses, and bit definitions.

// --- MCP23017 16-bit IO expander (IO Pi, Expander Pi IO) ---
pub mod mcp23017 {
    /// Default address of the first IO Pi bus (0x21 for the second).
    pub const DEFAULT_ADDRESS: u8 = 0x20;
    pub const PIN_COUNT: u8 = 16;

    // Register addresses, IOCON.BANK = 0 (port A at even, port B at odd offsets)
    pub const REG_IODIR: u8 = 0x00;
    pub const REG_IPOL: u8 = 0x02;
    pub const REG_IOCON: u8 = 0x0A;
    pub const REG_GPPU: u8 = 0x0C;
    pub const REG_GPIO: u8 = 0x12;
    pub const REG_OLAT: u8 = 0x14;

    pub const IOCON_SEQOP: u8 = 1 << 5;
    pub const IOCON_INTPOL: u8 = 1 << 1;
    /// IOCON value written at start-up: BANK=0, sequential operation
    /// disabled, INTPOL active-high. With SEQOP set the address pointer
    /// toggles within each A/B register pair.
    pub const IOCON_DEFAULT: u8 = IOCON_SEQOP | IOCON_INTPOL;
    /// Power-on value of IODIR (all inputs).
    pub const IODIR_RESET: u8 = 0xFF;
}

// --- MCP3424 18-bit delta-sigma ADC (ADC Pi, ADC Differential Pi) ---
pub mod mcp3424 {
    pub const DEFAULT_ADDRESS_1: u8 = 0x68;
    pub const DEFAULT_ADDRESS_2: u8 = 0x69;
    pub const CHANNELS_PER_CHIP: u8 = 4;

    // Configuration byte layout
    pub const CONFIG_RDY: u8 = 1 << 7;
    pub const CONFIG_CHANNEL_MASK: u8 = 0b0110_0000;
    pub const CONFIG_CHANNEL_SHIFT: u8 = 5;
    pub const CONFIG_CONTINUOUS: u8 = 1 << 4;
    pub const CONFIG_RATE_SHIFT: u8 = 2;

    /// Internal reference of the MCP3424.
    pub const VREF: f64 = 2.048;
    /// Resistor divider gain on the ADC Pi single-ended inputs.
    pub const ADC_PI_INPUT_SCALE: f64 = 2.471;
}

// --- MCP3202 2-channel 12-bit SPI ADC (ADC DAC Pi) ---
pub mod mcp3202 {
    pub const CHANNELS: u8 = 2;
    pub const BITS: u8 = 12;
    pub const START: u8 = 0x01;
    pub const SINGLE_ENDED: u8 = 1 << 7;
    pub const MSB_FIRST: u8 = 1 << 5;
    pub const CHANNEL_SHIFT: u8 = 6;
    pub const DEFAULT_VREF: f64 = 3.3;
}

// --- MCP3208 8-channel 12-bit SPI ADC (Expander Pi) ---
pub mod mcp3208 {
    pub const CHANNELS: u8 = 8;
    pub const BITS: u8 = 12;
    pub const START: u8 = 1 << 2;
    pub const SINGLE_ENDED: u8 = 1 << 1;
    pub const DEFAULT_VREF: f64 = 4.096;
}

// --- MCP4822 2-channel 12-bit SPI DAC (ADC DAC Pi, Expander Pi) ---
pub mod mcp4822 {
    pub const CHANNELS: u8 = 2;
    pub const BITS: u8 = 12;
    pub const CHANNEL_B: u16 = 1 << 15;
    /// GA bit set selects 1x gain, clear selects 2x.
    pub const GAIN_1X: u16 = 1 << 13;
    /// SHDN bit set keeps the output active.
    pub const ACTIVE: u16 = 1 << 12;
    pub const DATA_MASK: u16 = 0x0FFF;
    pub const VREF: f64 = 2.048;
    /// Supply rail on the Pi boards, which caps 2x-gain output.
    pub const SUPPLY_VOLTAGE: f64 = 3.3;
}

// --- DS1307 real-time clock (RTC Pi, Expander Pi RTC) ---
pub mod ds1307 {
    pub const DEFAULT_ADDRESS: u8 = 0x68;

    pub const REG_SECONDS: u8 = 0x00;
    pub const REG_CONTROL: u8 = 0x07;
    pub const DATE_LEN: usize = 7;

    pub const CLOCK_HALT: u8 = 1 << 7;
    pub const HOUR_12: u8 = 1 << 6;
    pub const HOUR_PM: u8 = 1 << 5;

    // Control register bits
    pub const CONTROL_OUT: u8 = 1 << 7;
    pub const CONTROL_SQWE: u8 = 1 << 4;
    pub const CONTROL_RS_MASK: u8 = 0b0000_0011;
    /// Control register value the board drivers start from.
    pub const CONTROL_DEFAULT: u8 = 0x03;

    // Battery-backed RAM
    pub const RAM_START: u8 = 0x08;
    pub const RAM_END: u8 = 0x3F;

    pub const DEFAULT_CENTURY: i32 = 2000;
}

// --- PCA9685 16-channel PWM controller (Servo Pi) ---
pub mod pca9685 {
    pub const DEFAULT_ADDRESS: u8 = 0x40;
    pub const CHANNELS: u8 = 16;

    pub const REG_MODE1: u8 = 0x00;
    pub const REG_MODE2: u8 = 0x01;
    pub const REG_LED0_ON_L: u8 = 0x06;
    pub const REG_ALL_LED_ON_L: u8 = 0xFA;
    pub const REG_PRE_SCALE: u8 = 0xFE;

    // MODE1 bits
    pub const MODE1_RESTART: u8 = 1 << 7;
    pub const MODE1_AUTO_INCREMENT: u8 = 1 << 5;
    pub const MODE1_SLEEP: u8 = 1 << 4;
    // MODE2 bits
    pub const MODE2_INVERT: u8 = 1 << 4;
    pub const MODE2_OUTPUT_CHANGE_ON_ACK: u8 = 1 << 3;
    pub const MODE2_TOTEM_POLE: u8 = 1 << 2;

    /// Full-on / full-off flag in the high byte of an ON or OFF count.
    pub const FULL_FLAG: u8 = 1 << 4;

    pub const MODE1_DEFAULT: u8 = MODE1_AUTO_INCREMENT;
    pub const MODE2_DEFAULT: u8 = MODE2_OUTPUT_CHANGE_ON_ACK | MODE2_TOTEM_POLE;

    pub const OSCILLATOR_HZ: f64 = 25_000_000.0;
    pub const COUNTER_STEPS: u16 = 4096;
    pub const PRESCALE_MIN: u8 = 0x03;
    pub const MAX_COUNT: u16 = 4095;
}

// --- PCA9546A 4-channel I2C switch (I2C Switch) ---
pub mod pca9546 {
    pub const DEFAULT_ADDRESS: u8 = 0x70;
    pub const CHANNELS: u8 = 4;
}
