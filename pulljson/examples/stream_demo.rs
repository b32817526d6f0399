// Example parsing a stream delivered in small chunks

use pulljson::{ChunkReader, JsonIter, ParseError};

fn main() -> Result<(), ParseError> {
    let json = br#"{"name": "hello\nworld", "items": [1, 2.5, true, null], "count": 42}"#;
    println!("Input: {}", String::from_utf8_lossy(json));
    println!("Total size: {} bytes, chunk size: 8 bytes", json.len());

    // Simulates network packets; the window starts small and grows on demand
    let reader = ChunkReader::new(json, 8);
    let mut iter = JsonIter::from_reader(reader, 16);

    let mut count = 0;
    iter.read_object_cb(|iter, field| {
        match field {
            "name" => println!("  name: {:?}", iter.read_string()?),
            "items" => {
                let items = iter.read_any()?.into_value()?;
                println!("  items: {items:?}");
            }
            "count" => count = iter.read_int()?,
            _ => iter.skip()?,
        }
        Ok(true)
    })?;
    println!("  count: {count}");
    println!("Finished at offset {}", iter.position());
    Ok(())
}
