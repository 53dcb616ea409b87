//! crates/course_advisor_core/src/prompts.rs
//!
//! Fixed instructional templates sent to the completion service. Caller text is
//! embedded verbatim.

use crate::domain::Course;

pub fn recommendation_prompt(query: &str) -> String {
    format!(
        r#"You are a helpful course recommender.
Based on the user's interests, skills, and goals, recommend relevant courses.
Format your response as a JSON array of courses with the following properties:
- title: The name of the course
- description: A brief description
- level: Beginner, Intermediate, or Advanced
- duration: Estimated time to complete (e.g., "8 weeks")
- provider: The platform or institution offering the course

The response should be a valid JSON array and nothing else. Do not include any explanation before or after the JSON array.

User query: {query}"#
    )
}

/// Detail prompt. `level` is free text here because the request comes straight
/// from the client.
pub fn details_prompt(title: &str, description: &str, level: &str, provider: &str) -> String {
    format!(
        r#"Generate detailed information about the following course:

Title: {title}
Description: {description}
Level: {level}
Provider: {provider}

Please provide a response in JSON format with the following fields:
1. "whatYouWillLearn": An array of 4-5 specific skills or concepts students will gain from this course
2. "prerequisites": An array of 2-3 recommended prerequisites for taking this course
3. "keyTopics": An array of 4-5 key topics covered in the course
4. "careerOpportunities": A brief paragraph about career opportunities related to this course
5. "estimatedStudyTime": A realistic weekly study time estimate (e.g., "5-7 hours per week")

Make sure your response is strictly in valid JSON format."#
    )
}

pub fn url_prompt(title: &str, provider: &str) -> String {
    format!(
        r#"Generate a realistic URL for a course titled "{title}" offered by "{provider}".
The URL should follow the provider's URL structure and include appropriate paths, slugs, and query parameters.
Return ONLY the full URL with no additional text, explanations, or code formatting."#
    )
}

pub fn insights_prompt(courses: &[Course], user_query: &str) -> String {
    let course_info = courses
        .iter()
        .enumerate()
        .map(|(index, course)| {
            format!(
                "Course {}: {} ({})\nDescription: {}\nProvider: {}\nDuration: {}",
                index + 1,
                course.title,
                course.level,
                course.description,
                course.provider,
                course.duration
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n");

    format!(
        r#"As an AI course advisor, analyze the following courses that were recommended based on the user's query: "{user_query}".

{course_info}

Provide a 4-5 sentence personalized learning path analysis for the user. Consider:
1. How these courses complement each other
2. The progression of skills from basic to advanced
3. The relevance to the user's original query
4. Long-term career or skill development potential

Make your response conversational, encouraging, and specific to the courses listed.
Do not include any preamble or introduction like "Based on the courses..." or "Looking at these courses...".
Just directly provide the analysis in a concise, helpful paragraph."#
    )
}
