#![no_main]
use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;

/// A semi-structured container builder so the fuzzer reaches past the magic
/// and layout checks more often than raw bytes would.
#[derive(Arbitrary, Debug)]
struct ContainerArb {
    name: String,
    version: String,
    with_memory: bool,
    memory_max: u32,
    corrupt_magic: bool,
    header_skew: u8,
    binary: Vec<u8>,
}

fuzz_target!(|input: ContainerArb| {
    // Construct a TOML manifest (sometimes intentionally malformed).
    let manifest = if input.name.is_empty() || input.version.is_empty() {
        format!("name = \"{}\"", input.name.replace('"', ""))
    } else {
        let mut s = format!(
            "name = {:?}\nversion = {:?}\n",
            input.name.replace('\n', " "),
            input.version.replace('\n', " ")
        );
        if input.with_memory {
            s.push_str(&format!(
                "[capabilities.memory]\nmax_bytes = {}\n",
                input.memory_max
            ));
        }
        s
    };

    let mut container = kapsel_container::compose_package_bytes(manifest.as_bytes(), &input.binary);
    if input.corrupt_magic {
        container[0] = b'X';
    }
    // Skew one header field byte to exercise the layout cross-checks.
    if input.header_skew != 0 {
        let at = 4 + (input.header_skew as usize) % 30;
        container[at] = container[at].wrapping_add(input.header_skew);
    }

    // Either Ok(_) or a clean Err(_); never a panic.
    let _ = kapsel_container::load_package(&container);
});
