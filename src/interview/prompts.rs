//! Fixed instruction templates sent to the text-generation collaborator.

/// Question-set template. The profile is embedded as pretty-printed JSON.
pub fn question_set_prompt(profile_json: &str) -> String {
    format!(
        r#"You are an experienced interview strategist who designs interview questions tailored to a specific candidate and role.

Candidate profile:
{profile_json}

---

Build an interview framework for this candidate. Start with a short, warm greeting that addresses the candidate by name and mentions one specific aspect of their work that stands out. Then write exactly 10 questions in this order:
- 3 basic technical questions
- 2 intermediate technical questions
- 2 advanced technical questions
- 1 thought process question
- 1 situational question
- 1 personal skills question

Technical questions should progress from basic to advanced and stay relevant to the candidate's skills and target role. Keep every question clear and concise and avoid jargon that could confuse the candidate.

---

Respond with a single JSON object and nothing else, shaped exactly like this:

{{
  "interview": {{
    "greeting_script": "...",
    "questions": [
      {{"category": "basic", "text": "..."}},
      {{"category": "basic", "text": "..."}},
      {{"category": "basic", "text": "..."}},
      {{"category": "intermediate", "text": "..."}},
      {{"category": "intermediate", "text": "..."}},
      {{"category": "advanced", "text": "..."}},
      {{"category": "advanced", "text": "..."}},
      {{"category": "thought_process", "text": "..."}},
      {{"category": "situational", "text": "..."}},
      {{"category": "personal_skills", "text": "..."}}
    ]
  }}
}}
"#
    )
}

/// Rubric template for scoring one answer.
pub fn evaluation_prompt(question: &str, answer: &str) -> String {
    format!(
        r#"You are an expert technical interviewer with long experience judging candidates on knowledge, problem solving and communication.

Assess the candidate's answer to the question below.
- Question: {question}
- Answer: {answer}

---

Give a score from 1 to 10 and feedback that names the strengths and weaknesses of the answer: relevance, clarity of explanation, depth of knowledge and any misconceptions. Judge the content, not the presentation style, and keep personal bias out of the assessment.

---

Respond with a single JSON object and nothing else. The score must be a whole number between 1 and 10 and feedback must contain at least one entry:

{{
  "evaluation": {{
    "score": 8,
    "feedback": [
      "Solid grasp of the concept; a concrete example would have strengthened the answer."
    ]
  }}
}}
"#
    )
}

/// Follow-up template: encouragement plus a probe into challenges faced.
pub fn follow_up_prompt(question: &str, answer: &str) -> String {
    format!(
        r#"You are a supportive interviewer. Your goal is to build the candidate's confidence while drawing out more detail about their experience.

Original question: {question}
Candidate's answer: {answer}

---

Acknowledge what the candidate got right, then ask one follow-up question about a specific challenge they faced in this area and how they dealt with it. The question must relate directly to their answer.

Reply with the follow-up question only, with no preamble or extra commentary.
"#
    )
}

/// Interpreter-imitation template for the coding round.
pub fn code_run_prompt(problem: &str, code: &str) -> String {
    format!(
        r#"Act as a Python interpreter. You will be given a programming problem and the candidate's Python code. Simulate running the code and reply only with the exact terminal output, or the exact traceback if it fails. Do not explain, summarise or add any other text.

# Example
problem: Print the squares of 1 to 3.
code:
for i in range(1, 4):
    print(i ** 2)
output:
1
4
9

# Example
problem: Divide a number by zero.
code:
a = 10
print(a / 0)
output:
Traceback (most recent call last):
  File "<stdin>", line 2, in <module>
ZeroDivisionError: division by zero

# Example
problem: Import a missing module.
code:
import notamodule
output:
Traceback (most recent call last):
  File "<stdin>", line 1, in <module>
ModuleNotFoundError: No module named 'notamodule'

---

problem: {problem}
code:
{code}
output:
"#
    )
}
