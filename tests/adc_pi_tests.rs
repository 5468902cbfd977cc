//! ADC Pi tests
//! MCP3424 configuration bytes, conversion polling and code decoding

mod common;

use approx::assert_abs_diff_eq;
use common::{MockBus, Operation};
use pi_board_drivers::{
    AdcPi, AdcPiConfig, BitRate, BusError, ConversionMode, Error, PgaGain,
};
use std::time::Duration;

const CHIP_1: u8 = 0x68;
const CHIP_2: u8 = 0x69;

// 18-bit, continuous, x1 gain, channel 1 of the chip
const CONFIG_18BIT_CONTINUOUS: u8 = 0x1C;

fn setup(config: AdcPiConfig) -> (MockBus, AdcPi<MockBus>) {
    let bus = MockBus::new();
    let adc = AdcPi::new(bus.clone(), config).expect("init ADC Pi");
    bus.clear_operations();
    (bus, adc)
}

#[test]
fn test_initial_configuration_written_to_both_chips() {
    let bus = MockBus::new();
    let adc = AdcPi::new(bus.clone(), AdcPiConfig::default()).unwrap();

    assert_eq!(
        bus.operations(),
        vec![
            Operation::Write {
                address: CHIP_1,
                data: vec![CONFIG_18BIT_CONTINUOUS],
            },
            Operation::Write {
                address: CHIP_2,
                data: vec![CONFIG_18BIT_CONTINUOUS],
            },
        ]
    );
    assert_eq!(adc.config_register(0), Some(CONFIG_18BIT_CONTINUOUS));
    assert_eq!(adc.config_register(1), Some(CONFIG_18BIT_CONTINUOUS));
    assert_eq!(adc.config_register(2), None);
}

#[test]
fn test_invalid_channel_generates_no_traffic() {
    let (bus, mut adc) = setup(AdcPiConfig::default());

    for channel in [0u8, 9] {
        match adc.read_raw(channel) {
            Err(Error::OutOfRange { what, min, max, .. }) => {
                assert_eq!(what, "channel");
                assert_eq!((min, max), (1, 8));
            }
            other => panic!("Expected OutOfRange, got {:?}", other),
        }
        assert!(adc.read_voltage(channel).is_err());
    }
    assert_eq!(bus.operation_count(), 0);
}

#[test]
fn test_continuous_mode_writes_only_on_channel_change() {
    let (bus, mut adc) = setup(AdcPiConfig::default());
    bus.set_sticky_read(CHIP_1, &[0x00, 0x00, 0x00, 0x00]);

    adc.read_raw(1).unwrap();
    adc.read_raw(1).unwrap();
    assert!(bus.writes().is_empty());

    adc.read_raw(2).unwrap();
    adc.read_raw(2).unwrap();
    assert_eq!(bus.writes(), vec![vec![0x3C]]);
    assert_eq!(adc.config_register(0), Some(0x3C));
}

#[test]
fn test_second_chip_serves_upper_channels() {
    let (bus, mut adc) = setup(AdcPiConfig::default());
    bus.set_sticky_read(CHIP_2, &[0x00, 0x00, 0x00, 0x00]);

    adc.read_raw(8).unwrap();

    assert_eq!(
        bus.operations()[0],
        Operation::Write {
            address: CHIP_2,
            data: vec![0x7C],
        }
    );
    assert_eq!(
        bus.operations()[1],
        Operation::Read {
            address: CHIP_2,
            len: 4,
        }
    );
}

#[test]
fn test_one_shot_starts_a_conversion_per_read() {
    let config = AdcPiConfig::default().with_conversion_mode(ConversionMode::OneShot);
    let (bus, mut adc) = setup(config);
    bus.set_sticky_read(CHIP_1, &[0x00, 0x00, 0x10, 0x0C]);

    assert_eq!(adc.read_raw(1).unwrap(), 16);
    assert_eq!(adc.read_raw(1).unwrap(), 16);

    // RDY set in the written byte, cleared in the shadow
    assert_eq!(bus.writes(), vec![vec![0x8C], vec![0x8C]]);
    assert_eq!(adc.config_register(0), Some(0x0C));
}

#[test]
fn test_waits_for_conversion_ready() {
    let (bus, mut adc) = setup(AdcPiConfig::default());
    bus.queue_read(CHIP_1, &[0x00, 0x00, 0x00, 0x9C]);
    bus.queue_read(CHIP_1, &[0x00, 0x00, 0x00, 0x9C]);
    bus.queue_read(CHIP_1, &[0x00, 0x10, 0x00, 0x1C]);

    assert_eq!(adc.read_raw(1).unwrap(), 4096);
    assert_eq!(bus.operation_count(), 3);
}

#[test]
fn test_conversion_timeout_is_a_bus_timeout() {
    let config = AdcPiConfig::default().with_conversion_timeout(Duration::from_millis(5));
    let (bus, mut adc) = setup(config);
    bus.set_sticky_read(CHIP_1, &[0x00, 0x00, 0x00, 0x9C]);

    match adc.read_raw(1) {
        Err(Error::Bus(BusError::Timeout { address })) => assert_eq!(address, CHIP_1),
        other => panic!("Expected timeout, got {:?}", other),
    }
}

#[test]
fn test_read_error_propagates() {
    let (bus, mut adc) = setup(AdcPiConfig::default());
    bus.fail_next_read(BusError::Nack { address: CHIP_1 });

    assert!(matches!(
        adc.read_raw(1),
        Err(Error::Bus(BusError::Nack { .. }))
    ));
}

#[test]
fn test_18bit_decoding() {
    let (bus, mut adc) = setup(AdcPiConfig::default().with_input_scale(1.0));

    // Upper bits of the first byte are sign extension and must be masked
    bus.queue_read(CHIP_1, &[0xFC, 0x80, 0x00, 0x1C]);
    assert_eq!(adc.read_raw(1).unwrap(), 0x8000);

    bus.queue_read(CHIP_1, &[0x01, 0xFF, 0xFF, 0x1C]);
    assert_eq!(adc.read_raw(1).unwrap(), 131_071);

    bus.queue_read(CHIP_1, &[0x01, 0xFF, 0xFF, 0x1C]);
    assert_abs_diff_eq!(adc.read_voltage(1).unwrap(), 2.048, epsilon = 1e-9);
}

#[test]
fn test_negative_codes() {
    let (bus, mut single) = setup(AdcPiConfig::default());
    bus.set_sticky_read(CHIP_1, &[0x03, 0xFF, 0xFF, 0x1C]);
    assert_eq!(single.read_raw(1).unwrap(), -1);
    assert_eq!(single.read_voltage(1).unwrap(), 0.0);

    let (bus, mut differential) = setup(AdcPiConfig::differential());
    bus.set_sticky_read(CHIP_1, &[0x02, 0x00, 0x00, 0x1C]);
    assert_eq!(differential.read_raw(1).unwrap(), -131_072);
    assert_abs_diff_eq!(
        differential.read_voltage(1).unwrap(),
        -131_072.0 * 2.048 / 131_071.0,
        epsilon = 1e-9
    );
}

#[test]
fn test_input_scale_and_pga_applied() {
    let config = AdcPiConfig::default()
        .with_bit_rate(BitRate::Bits12)
        .with_pga(PgaGain::X2);
    let (bus, mut adc) = setup(config);
    // 12-bit reads are two data bytes and a status byte
    bus.set_sticky_read(CHIP_1, &[0x04, 0x00, 0x11]);

    assert_eq!(adc.read_raw(1).unwrap(), 1024);
    let expected = 1024.0 * 2.048 / 2047.0 / 2.0 * 2.471;
    assert_abs_diff_eq!(adc.read_voltage(1).unwrap(), expected, epsilon = 1e-9);
    assert!(bus.operations().iter().all(|op| match op {
        Operation::Read { len, .. } => *len == 3,
        _ => true,
    }));
}

#[test]
fn test_settings_rewrite_both_chips_keeping_channel() {
    let (bus, mut adc) = setup(AdcPiConfig::default());
    bus.set_sticky_read(CHIP_1, &[0x00, 0x00, 0x00, 0x00]);
    adc.read_raw(3).unwrap();
    bus.clear_operations();

    adc.set_pga(PgaGain::X8).unwrap();

    assert_eq!(
        bus.operations(),
        vec![
            Operation::Write {
                address: CHIP_1,
                data: vec![0x5F],
            },
            Operation::Write {
                address: CHIP_2,
                data: vec![0x1F],
            },
        ]
    );
    assert_eq!(adc.config().pga, PgaGain::X8);
}

#[test]
fn test_bad_input_scale_rejected() {
    let bus = MockBus::new();
    let result = AdcPi::new(bus.clone(), AdcPiConfig::default().with_input_scale(0.0));

    assert!(matches!(result, Err(Error::Configuration(_))));
    assert_eq!(bus.operation_count(), 0);
}
