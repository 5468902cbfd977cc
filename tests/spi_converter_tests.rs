//! SPI converter tests
//! MCP3202 / MCP3208 command frames and MCP4822 DAC words, plus the
//! ADC DAC Pi and Expander Pi board wrappers

mod common;

use approx::assert_abs_diff_eq;
use common::{MockBus, MockSpi};
use pi_board_drivers::{
    AdcDacPi, AdcDacPiConfig, BusError, DacGain, Error, ExpanderPi, ExpanderPiConfig,
    GpioDirection, InputMode, Mcp3202, Mcp3208, Mcp4822,
};

// --- MCP3202 ---

#[test]
fn test_mcp3202_command_frames() {
    let spi = MockSpi::new();
    let mut adc = Mcp3202::new(spi.clone(), 3.3).unwrap();

    adc.read_raw(1, InputMode::SingleEnded).unwrap();
    adc.read_raw(2, InputMode::SingleEnded).unwrap();
    adc.read_raw(1, InputMode::Differential).unwrap();
    adc.read_raw(2, InputMode::Differential).unwrap();

    assert_eq!(
        spi.sent(),
        vec![
            vec![0x01, 0xA0, 0x00],
            vec![0x01, 0xE0, 0x00],
            vec![0x01, 0x20, 0x00],
            vec![0x01, 0x60, 0x00],
        ]
    );
}

#[test]
fn test_mcp3202_mid_scale_reading() {
    let spi = MockSpi::new();
    let mut adc = Mcp3202::new(spi.clone(), 3.3).unwrap();
    // Only the low nibble of the second byte carries data
    spi.queue_response(&[0xFF, 0xF8, 0x00]);
    spi.queue_response(&[0x00, 0x08, 0x00]);

    assert_eq!(adc.read_raw(1, InputMode::SingleEnded).unwrap(), 2048);
    assert_abs_diff_eq!(
        adc.read_voltage(1, InputMode::SingleEnded).unwrap(),
        1.6504,
        epsilon = 1e-3
    );
}

#[test]
fn test_mcp3202_invalid_channel_and_vref() {
    let spi = MockSpi::new();
    let mut adc = Mcp3202::new(spi.clone(), 3.3).unwrap();

    assert!(matches!(
        adc.read_raw(3, InputMode::SingleEnded),
        Err(Error::OutOfRange { .. })
    ));
    assert!(matches!(
        adc.read_raw(0, InputMode::SingleEnded),
        Err(Error::OutOfRange { .. })
    ));
    assert_eq!(spi.transfer_count(), 0);

    assert!(adc.set_reference_voltage(-1.0).is_err());
    assert!(adc.set_reference_voltage(f64::NAN).is_err());
    assert_eq!(adc.reference_voltage(), 3.3);
    assert!(Mcp3202::new(MockSpi::new(), 0.0).is_err());
}

// --- MCP3208 ---

#[test]
fn test_mcp3208_command_frames() {
    let spi = MockSpi::new();
    let mut adc = Mcp3208::new(spi.clone(), 4.096).unwrap();

    adc.read_raw(1, InputMode::SingleEnded).unwrap();
    adc.read_raw(8, InputMode::SingleEnded).unwrap();
    adc.read_raw(5, InputMode::Differential).unwrap();

    assert_eq!(
        spi.sent(),
        vec![
            vec![0x06, 0x00, 0x00],
            vec![0x07, 0xC0, 0x00],
            vec![0x05, 0x00, 0x00],
        ]
    );
}

#[test]
fn test_mcp3208_full_scale() {
    let spi = MockSpi::new();
    let mut adc = Mcp3208::new(spi.clone(), 4.096).unwrap();
    spi.queue_response(&[0x00, 0x0F, 0xFF]);

    assert_abs_diff_eq!(
        adc.read_voltage(3, InputMode::SingleEnded).unwrap(),
        4.096,
        epsilon = 1e-9
    );
    assert!(adc.read_raw(9, InputMode::SingleEnded).is_err());
    assert_eq!(spi.transfer_count(), 1);
}

#[test]
fn test_reference_voltage_rejected_by_both_adcs() {
    for vref in [0.0, -3.3, f64::INFINITY] {
        assert!(matches!(
            Mcp3202::new(MockSpi::new(), vref),
            Err(Error::Configuration(_))
        ));
        assert!(matches!(
            Mcp3208::new(MockSpi::new(), vref),
            Err(Error::Configuration(_))
        ));
    }

    let mut adc = Mcp3208::new(MockSpi::new(), 4.096).unwrap();
    assert!(matches!(
        adc.set_reference_voltage(f64::NAN),
        Err(Error::Configuration(_))
    ));
    assert_eq!(adc.reference_voltage(), 4.096);
}

// --- MCP4822 ---

#[test]
fn test_dac_words() {
    let spi = MockSpi::new();
    let mut dac = Mcp4822::new(spi.clone(), DacGain::X1);

    dac.set_raw(1, 2048).unwrap();
    dac.set_gain(DacGain::X2);
    dac.set_raw(2, 4095).unwrap();

    assert_eq!(spi.sent(), vec![vec![0x38, 0x00], vec![0x9F, 0xFF]]);
    assert_eq!(dac.last_raw(1).unwrap(), Some(2048));
    assert_eq!(dac.last_raw(2).unwrap(), Some(4095));
}

#[test]
fn test_dac_rejects_unrepresentable_values() {
    let spi = MockSpi::new();
    let mut dac = Mcp4822::new(spi.clone(), DacGain::X1);

    assert!(matches!(dac.set_raw(1, 4096), Err(Error::OutOfRange { .. })));
    assert!(matches!(
        dac.set_voltage(1, 2.5),
        Err(Error::ValueOutOfRange { .. })
    ));
    assert!(matches!(
        dac.set_voltage(1, -0.1),
        Err(Error::ValueOutOfRange { .. })
    ));
    assert!(matches!(dac.set_raw(3, 0), Err(Error::OutOfRange { .. })));
    assert_eq!(spi.transfer_count(), 0);
    assert_eq!(dac.last_raw(1).unwrap(), None);
}

#[test]
fn test_dac_voltage_uses_gain() {
    let spi = MockSpi::new();
    let mut dac = Mcp4822::new(spi.clone(), DacGain::X1);

    assert_eq!(dac.set_voltage(1, 1.0).unwrap(), 2000);
    assert_eq!(dac.set_voltage(1, 2.048).unwrap(), 4095);

    dac.set_gain(DacGain::X2);
    // 2x gain is capped by the 3.3 V supply
    assert_abs_diff_eq!(dac.max_voltage(), 3.3);
    assert_eq!(dac.set_voltage(2, 3.3).unwrap(), 3299);
    assert!(dac.set_voltage(2, 3.4).is_err());
}

#[test]
fn test_dac_shutdown_and_failed_write() {
    let spi = MockSpi::new();
    let mut dac = Mcp4822::new(spi.clone(), DacGain::X1);
    dac.set_raw(2, 100).unwrap();

    dac.shutdown(2).unwrap();
    assert_eq!(spi.sent()[1], vec![0x80, 0x00]);
    assert_eq!(dac.last_raw(2).unwrap(), None);

    dac.set_raw(1, 10).unwrap();
    spi.fail_next(BusError::Other {
        address: 0,
        message: "spi".to_string(),
    });
    assert!(dac.set_raw(1, 20).is_err());
    assert_eq!(dac.last_raw(1).unwrap(), Some(10));
}

// --- Boards ---

#[test]
fn test_adc_dac_pi_board() {
    let adc_spi = MockSpi::new();
    let dac_spi = MockSpi::new();
    let config = AdcDacPiConfig::default().with_dac_gain(DacGain::X2);
    let mut board = AdcDacPi::new(adc_spi.clone(), dac_spi.clone(), config).unwrap();

    adc_spi.queue_response(&[0x00, 0x0F, 0xFF]);
    assert_abs_diff_eq!(
        board.read_adc_voltage(2, InputMode::SingleEnded).unwrap(),
        3.3,
        epsilon = 1e-9
    );

    board.set_adc_refvoltage(5.0).unwrap();
    adc_spi.queue_response(&[0x00, 0x0F, 0xFF]);
    assert_abs_diff_eq!(
        board.read_adc_voltage(1, InputMode::SingleEnded).unwrap(),
        5.0,
        epsilon = 1e-9
    );

    board.set_dac_raw(1, 0).unwrap();
    board.set_dac_gain(DacGain::X1);
    board.set_dac_raw(1, 0).unwrap();
    assert_eq!(dac_spi.sent(), vec![vec![0x10, 0x00], vec![0x30, 0x00]]);
}

#[test]
fn test_expander_pi_board() {
    let bus = MockBus::new();
    let adc_spi = MockSpi::new();
    let dac_spi = MockSpi::new();

    let mut board = ExpanderPi::new(
        bus.clone(),
        adc_spi.clone(),
        dac_spi.clone(),
        ExpanderPiConfig::default(),
    )
    .unwrap();

    // IO section initialised, RTC control register set
    assert_eq!(bus.register(0x20, 0x0A), 0x22);
    assert_eq!(bus.register(0x20, 0x00), 0xFF);
    assert_eq!(bus.register(0x68, 0x07), 0x03);

    board.io.set_pin_direction(1, GpioDirection::Output).unwrap();
    assert_eq!(bus.register(0x20, 0x00), 0xFE);

    adc_spi.queue_response(&[0x00, 0x08, 0x00]);
    assert_abs_diff_eq!(
        board.adc.read_voltage(1, InputMode::SingleEnded).unwrap(),
        2048.0 * 4.096 / 4095.0,
        epsilon = 1e-9
    );

    board.dac.set_voltage(2, 1.0).unwrap();
    assert_eq!(dac_spi.transfer_count(), 1);
}
