//! Prompt construction for the generative-model endpoint.

use crate::models::TripRequest;

/// Builds the instruction text sent to the model. Pure, no failure mode.
///
/// The field labels, their ordering, and the response schema description are
/// part of the external contract: the model parses this natural-language
/// instruction, not a schema, so the wording must stay stable. Both the
/// primary and the escalation cycle use this same builder.
#[must_use]
pub fn build_prompt(request: &TripRequest) -> String {
    let continuation_points = match &request.continuation_points {
        Some(points) => points.join(", "),
        None => "None".to_string(),
    };

    format!(
        "Request:\n\
         Start Location: {}\n\
         Finish Location: {}\n\
         Continuation Points: {}\n\
         Departure Date: {}\n\
         Duration: {}\n\n\
         When planning Duration need to make sure be equal to the Plan Days \n\
         Respond Need to be in Raw Json: \n\
         Title \n\
         Description \n\
         Region \n\
         Currency \n\
         Plan(list topics will be day,destination,distance,duration,Activities)",
        request.start_location,
        request.finish_location,
        continuation_points,
        request.departure_date.format("%Y-%m-%dT%H:%M:%SZ"),
        request.duration
    )
}
