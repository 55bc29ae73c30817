use astroframe_frame::Variant;

use crate::cmd::{operation_label, FrameArgs};
use crate::exit::{frame_error, CliResult, SUCCESS};
use crate::output::{print_frame, OutputFormat};

pub fn run(args: FrameArgs, variant: Variant, format: OutputFormat) -> CliResult<i32> {
    let codec = variant.codec();
    let request = args.request.to_request(codec.geo_order())?;
    let wire = codec
        .encode(&request)
        .map_err(|err| frame_error("encode failed", err))?;

    print_frame(variant, &operation_label(&request), &wire, format);
    Ok(SUCCESS)
}
