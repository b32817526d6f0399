// Example walking a document with the pull API

use pulljson::{JsonIter, ParseError, ValueType};

fn print_value(iter: &mut JsonIter<'_>, indent: usize) -> Result<(), ParseError> {
    let pad = "  ".repeat(indent);
    match iter.what_is_next()? {
        ValueType::Object => {
            println!("{pad}Object");
            while let Some(field) = iter.read_object()? {
                println!("{pad}  Key: '{field}'");
                print_value(iter, indent + 2)?;
            }
        }
        ValueType::Array => {
            println!("{pad}Array");
            while iter.read_array()? {
                print_value(iter, indent + 1)?;
            }
        }
        ValueType::String => println!("{pad}String: '{}'", iter.read_str()?),
        ValueType::Number => println!("{pad}Number: {}", iter.read_number_as_string()?),
        ValueType::Boolean => println!("{pad}Bool: {}", iter.read_boolean()?),
        ValueType::Null => {
            iter.read_null()?;
            println!("{pad}Null");
        }
        ValueType::Invalid => iter.skip()?,
    }
    Ok(())
}

fn main() -> Result<(), ParseError> {
    let json = r#"{"name": "value", "number": 42, "flag": true, "list": [1.5, null, "x\ty"]}"#;
    println!("Input: {json}");
    let mut iter = JsonIter::from_text(json);
    print_value(&mut iter, 0)?;

    println!();
    println!("Successfully parsed with the pull API");
    Ok(())
}
