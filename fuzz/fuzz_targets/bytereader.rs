#![no_main]

use bytestream::ByteReader;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let mut reader = ByteReader::new(data);
    let mut idx = 0usize;

    // Input bytes pick the operations; the reader consumes the same input.
    while idx < data.len() && idx < 1024 {
        let op = data[idx] % 7;
        idx += 1;

        let before = reader.remaining();
        let ok = match op {
            0 => reader.read_u8().is_ok(),
            1 => reader.read_u16_be().is_ok(),
            2 => reader.read_u32_le().is_ok(),
            3 => reader.read_f64_le().is_ok(),
            4 => reader.read_array::<16>().is_ok(),
            5 => {
                let len = usize::from(data[idx - 1]);
                reader.read_bytes(len).is_ok()
            }
            _ => reader.read_u64_le().is_ok(),
        };
        if !ok {
            assert_eq!(reader.remaining(), before);
        }
    }
});
